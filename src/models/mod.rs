//! Domain models for Cairn.
//!
//! # Core Concepts
//!
//! ## Persisted Entities
//!
//! - [`Project`]: Top-level container for tasks and timeline events, owned by
//!   an optional [`User`].
//! - [`Task`]: A unit of work within a project, optionally nested via `parent_id`.
//! - [`TimelineEvent`]: A titled, dated milestone attached to a project.
//! - [`User`]: Minimal identity record used for project ownership and task
//!   assignment.
//!
//! ## Ephemeral Shapes
//!
//! - Draft timeline events (see [`crate::timeline::DraftEvent`]) exist only in
//!   memory between markdown upload and project creation; they are persisted
//!   atomically with their owning project.
//! - Enriched overdue views (see [`crate::timeline::OverdueEvent`]) are
//!   computed per aggregation request and never stored.
//!
//! Status, priority and type tags are closed enums with a single
//! `as_str`/`from_str` mapping each; the same tag strings are used in SQLite
//! and on the wire.

mod event;
mod project;
mod task;
mod user;

pub use event::*;
pub use project::*;
pub use task::*;
pub use user::*;
