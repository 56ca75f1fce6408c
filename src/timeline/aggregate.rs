use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EventWithProject;

/// An overdue timeline event enriched with elapsed-time fields for display.
///
/// Computed per aggregation request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueEvent {
    #[serde(flatten)]
    pub entry: EventWithProject,
    /// Whole days elapsed since the event date, floored.
    pub days_overdue: i64,
    /// Whole hours elapsed since the event date, floored.
    pub hours_overdue: i64,
    /// Human-readable magnitude, e.g. "1 day overdue" or "23 hours overdue".
    pub overdue_text: String,
}

/// The inclusive `[00:00:00.000, 23:59:59.999]` window of a calendar day.
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

fn events_in_window(
    events: &[EventWithProject],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<EventWithProject> {
    let mut selected: Vec<EventWithProject> = events
        .iter()
        .filter(|e| e.event.date >= start && e.event.date <= end)
        .cloned()
        .collect();
    selected.sort_by_key(|e| e.event.date);
    selected
}

/// Events dated within the calendar day of `now`, both bounds inclusive,
/// ascending by date. No status filter.
pub fn today(events: &[EventWithProject], now: DateTime<Utc>) -> Vec<EventWithProject> {
    let (start, end) = day_bounds(now.date_naive());
    events_in_window(events, start, end)
}

/// Events dated within the calendar day after `now`, both bounds inclusive,
/// ascending by date. No status filter at the query level; see
/// [`filter_event_types`] for the milestones-view restriction.
pub fn tomorrow(events: &[EventWithProject], now: DateTime<Utc>) -> Vec<EventWithProject> {
    let day = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .expect("tomorrow is representable");
    let (start, end) = day_bounds(day);
    events_in_window(events, start, end)
}

/// Restrict events to a subset of type tags, case-insensitively.
///
/// A presentation-layer choice layered on top of the base queries (e.g.
/// milestone/deadline/release for a "milestones" panel), not a separate
/// aggregation.
pub fn filter_event_types(events: Vec<EventWithProject>, types: &[String]) -> Vec<EventWithProject> {
    events
        .into_iter()
        .filter(|e| {
            types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&e.event.event_type))
        })
        .collect()
}

/// Events whose date has passed while the owning project is still active,
/// sorted descending by date so the most recently missed event surfaces
/// first, each enriched with overdue magnitudes.
///
/// Events on `COMPLETED` or `CANCELLED` projects never appear.
pub fn overdue(events: &[EventWithProject], now: DateTime<Utc>) -> Vec<OverdueEvent> {
    let mut selected: Vec<EventWithProject> = events
        .iter()
        .filter(|e| e.event.date < now && !e.project.status.is_terminal())
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.event.date.cmp(&a.event.date));

    selected
        .into_iter()
        .map(|entry| {
            let elapsed = now - entry.event.date;
            let days_overdue = elapsed.num_days();
            let hours_overdue = elapsed.num_hours();
            OverdueEvent {
                entry,
                days_overdue,
                hours_overdue,
                overdue_text: overdue_text(days_overdue, hours_overdue),
            }
        })
        .collect()
}

/// Magnitude rule: whole days when at least one has elapsed, otherwise whole
/// hours. An event overdue by 30 minutes reads "0 hours overdue" — the hour
/// floor is the finest unit reported.
fn overdue_text(days_overdue: i64, hours_overdue: i64) -> String {
    if days_overdue > 0 {
        format!(
            "{} day{} overdue",
            days_overdue,
            if days_overdue == 1 { "" } else { "s" }
        )
    } else {
        format!(
            "{} hour{} overdue",
            hours_overdue,
            if hours_overdue == 1 { "" } else { "s" }
        )
    }
}
