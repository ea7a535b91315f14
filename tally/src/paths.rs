//! Builders for the document paths the aggregation core reads and writes.
//! Dashboards and upstream flows address the same documents, so these are
//! wire-stable.

use tally_store::{CollectionPath, DocPath, Result};

pub fn registrant(event_id: &str, registrant_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/registrants/{registrant_id}"))
}

pub fn registrants(event_id: &str) -> Result<CollectionPath> {
    CollectionPath::parse(format!("events/{event_id}/registrants"))
}

pub fn event(event_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}"))
}

pub fn session(event_id: &str, session_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/sessions/{session_id}"))
}

pub fn sessions(event_id: &str) -> Result<CollectionPath> {
    CollectionPath::parse(format!("events/{event_id}/sessions"))
}

pub fn attendance(event_id: &str, session_id: &str, registrant_id: &str) -> Result<DocPath> {
    DocPath::parse(format!(
        "events/{event_id}/sessions/{session_id}/attendance/{registrant_id}"
    ))
}

pub fn attendance_collection(event_id: &str, session_id: &str) -> Result<CollectionPath> {
    CollectionPath::parse(format!("events/{event_id}/sessions/{session_id}/attendance"))
}

pub fn overview_stats(event_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/stats/overview"))
}

pub fn checkin_bucket(event_id: &str, bucket_id: &str) -> Result<DocPath> {
    DocPath::parse(format!(
        "events/{event_id}/stats/overview/checkinBuckets/{bucket_id}"
    ))
}

pub fn global_analytics(event_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/analytics/global"))
}

pub fn session_summary(event_id: &str, session_id: &str) -> Result<DocPath> {
    DocPath::parse(format!(
        "events/{event_id}/sessions/{session_id}/analytics/summary"
    ))
}

pub fn attendee_index(event_id: &str, registrant_id: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/attendeeIndex/{registrant_id}"))
}

pub fn admin_role(event_id: &str, email: &str) -> Result<DocPath> {
    DocPath::parse(format!("events/{event_id}/admins/{email}"))
}
