use crate::types::EventRecord;
use serde::Serialize;

/// The wire shape returned for a matched event.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub name: String,
    pub days: i64,
    pub website_url: String,
}

/// Finds the first record whose id, stringified, equals the requested id
/// and builds the summary projection.
///
/// The comparison is on the string form, so "007" does not match an id of
/// 7. When the upstream returns duplicate ids the first in collection
/// order wins; that is documented behavior, not an ordering contract.
/// `days` is a signed difference and goes negative when an event ends
/// before it starts.
pub fn resolve(events: &[EventRecord], id: &str) -> Option<EventSummary> {
    let event = events.iter().find(|event| event.id.to_string() == id)?;

    Some(EventSummary {
        name: event.name.clone(),
        days: (event.date_end - event.date_start).num_days(),
        website_url: event.url.clone(),
    })
}
