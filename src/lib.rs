//! Cairn: a project and milestone tracking server.
//!
//! Projects carry tasks and a timeline of dated events. Timelines can be
//! derived from an uploaded markdown document (one event per H1 header,
//! spaced by a fixed day interval) and are queried back through daily,
//! tomorrow and overdue dashboard aggregations.

pub mod api;
pub mod db;
pub mod markdown;
pub mod models;
pub mod timeline;
