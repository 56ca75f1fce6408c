use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A generator-produced timeline event not yet persisted.
///
/// Drafts are addressable only by position within their batch; whenever the
/// headers, start date or spacing change, the whole batch is recomputed and
/// replaced rather than patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// A single-field replacement applied to one draft by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum DraftPatch {
    Title(String),
    Description(Option<String>),
    Date(NaiveDate),
    Type(String),
}

/// Deterministically map an ordered header list to dated draft events.
///
/// Event `i` lands on `start_date + i * spacing_days`; the first event lands
/// exactly on `start_date` and a spacing of zero collapses all events onto
/// it. Dates are computed with whole-day calendar arithmetic on [`NaiveDate`],
/// so the projection cannot drift across DST or timezone boundaries. An empty
/// header list yields an empty batch.
pub fn generate(headers: &[String], start_date: NaiveDate, spacing_days: u32) -> Vec<DraftEvent> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| DraftEvent {
            title: header.clone(),
            description: Some(format!("Generated from markdown H1 header: \"{header}\"")),
            date: start_date
                .checked_add_days(Days::new(i as u64 * u64::from(spacing_days)))
                .unwrap_or(NaiveDate::MAX),
            event_type: "milestone".to_string(),
        })
        .collect()
}

/// Total span of a draft batch in days: last event date minus first.
///
/// Order within the batch is the sole ordering signal, so "first" and "last"
/// are positional, not min/max.
pub fn total_duration_days(drafts: &[DraftEvent]) -> i64 {
    match (drafts.first(), drafts.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days(),
        _ => 0,
    }
}

/// Replace one field of the draft at `index`. Returns `false` when the index
/// is out of range.
pub fn apply_patch(drafts: &mut [DraftEvent], index: usize, patch: DraftPatch) -> bool {
    let Some(draft) = drafts.get_mut(index) else {
        return false;
    };

    match patch {
        DraftPatch::Title(title) => draft.title = title,
        DraftPatch::Description(description) => draft.description = description,
        DraftPatch::Date(date) => draft.date = date,
        DraftPatch::Type(event_type) => draft.event_type = event_type,
    }

    true
}

/// Delete the draft at `index`, re-packing the remaining positions
/// contiguously. Returns `false` when the index is out of range.
pub fn remove_draft(drafts: &mut Vec<DraftEvent>, index: usize) -> bool {
    if index >= drafts.len() {
        return false;
    }
    drafts.remove(index);
    true
}
