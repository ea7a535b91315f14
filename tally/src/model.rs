use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ranked entry of a top-5 snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    pub name: String,
    pub count: i64,
}

/// First check-in recorded for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstSessionEntry {
    pub at: DateTime<Utc>,
    pub registrant_id: String,
}

/// Legacy dashboard aggregate at `events/{eventId}/stats/overview`.
///
/// Field names are wire-stable; dashboards read them verbatim. Every counter
/// equals the number of source events durably applied to it exactly once,
/// and map keys always come out of [`to_safe_key`](crate::to_safe_key).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverviewStats {
    pub total_registrations: i64,
    pub total_checked_in: i64,
    pub early_bird_count: i64,
    pub region_counts: BTreeMap<String, i64>,
    pub region_other_text_counts: BTreeMap<String, i64>,
    pub ministry_counts: BTreeMap<String, i64>,
    pub service_counts: BTreeMap<String, i64>,
    pub session_totals: BTreeMap<String, i64>,
    pub top5_regions: Vec<TopEntry>,
    pub top5_ministries: Vec<TopEntry>,
    pub top5_services: Vec<TopEntry>,
    pub top5_region_other_text: Vec<TopEntry>,
    pub first_check_in_at: Option<DateTime<Utc>>,
    pub first_check_in_registrant_id: Option<String>,
    pub first_early_bird_registered_at: Option<DateTime<Utc>>,
    pub first_early_bird_registrant_id: Option<String>,
    pub first_session_check_in: BTreeMap<String, FirstSessionEntry>,
    pub peak_minute_bucket_id: Option<String>,
    pub peak_minute_count: i64,
    pub peak_check_in_minute: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-minute check-in counter at
/// `events/{eventId}/stats/overview/checkinBuckets/{bucketId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinBucket {
    pub count: i64,
}

/// Earliest check-in winner, by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarliestCheckin {
    pub registrant_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Earliest registration winner, by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarliestRegistration {
    pub registrant_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Event-wide rollup at `events/{eventId}/analytics/global`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalAnalytics {
    pub total_checkins: i64,
    pub total_unique_attendees: i64,
    pub total_registrants: i64,
    pub region_counts: BTreeMap<String, i64>,
    pub ministry_counts: BTreeMap<String, i64>,
    /// 15-minute buckets, keyed by [`quarter_hour_bucket_id`](crate::quarter_hour_bucket_id).
    pub hourly_checkins: BTreeMap<String, i64>,
    pub earliest_checkin: Option<EarliestCheckin>,
    pub earliest_registration: Option<EarliestRegistration>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Session-scoped rollup at
/// `events/{eventId}/sessions/{sessionId}/analytics/summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSummary {
    pub attendance_count: i64,
    pub region_counts: BTreeMap<String, i64>,
    pub ministry_counts: BTreeMap<String, i64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Created once per registrant on their first attendance record anywhere;
/// its existence is the cross-session unique-attendee signal. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeIndex {
    pub first_session: String,
    pub first_checkin_time: DateTime<Utc>,
}

/// Static-ish session reference data seeded by
/// [`admin::initialize_event`](crate::admin::initialize_event).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSeed {
    pub id: String,
    pub name: String,
    pub location: String,
    pub order: i64,
}
