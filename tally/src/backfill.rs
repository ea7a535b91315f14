//! Full-scan reconciliation of the analytics aggregates.
//!
//! Re-derives global analytics, every session summary and the attendee
//! index from the source-of-truth collections and merge-overwrites them
//! (last writer wins, not incremental). Cost is one registrant lookup per
//! attendance record, so this runs administratively, never per event.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde_json::Value;
use tally_store::{Patch, Store};

use crate::{
    error::Result,
    model::{EarliestCheckin, EarliestRegistration},
    normalize::{quarter_hour_bucket_id, to_safe_key},
    paths,
    resolve::{as_timestamp, resolve_registered_at, resolve_string},
};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub total_unique_attendees: i64,
    pub total_checkins: i64,
    pub total_registrants: i64,
    pub sessions_processed: usize,
}

pub async fn backfill_analytics(store: &Store, event_id: &str) -> Result<BackfillReport> {
    let mut global_regions: BTreeMap<String, i64> = BTreeMap::new();
    let mut global_ministries: BTreeMap<String, i64> = BTreeMap::new();
    let mut hourly: BTreeMap<String, i64> = BTreeMap::new();
    let mut earliest_checkin: Option<EarliestCheckin> = None;
    let mut seen_registrants: BTreeSet<String> = BTreeSet::new();
    let mut total_checkins = 0_i64;

    let sessions = store.list(&paths::sessions(event_id)?).await?;

    for session in &sessions {
        let session_id = session.path.id().to_owned();
        let mut attendance_count = 0_i64;
        let mut session_regions: BTreeMap<String, i64> = BTreeMap::new();
        let mut session_ministries: BTreeMap<String, i64> = BTreeMap::new();

        let records = store
            .list(&paths::attendance_collection(event_id, &session_id)?)
            .await?;

        for record in &records {
            let registrant_id = record.path.id().to_owned();
            let ts = record
                .field("checkedInAt")
                .and_then(as_timestamp)
                .unwrap_or_else(Utc::now);
            let first_sighting = seen_registrants.insert(registrant_id.clone());

            attendance_count += 1;
            total_checkins += 1;

            let registrant = store
                .get(&paths::registrant(event_id, &registrant_id)?)
                .await?;
            let registrant_data = registrant.data.unwrap_or(Value::Null);
            let region =
                resolve_string(&registrant_data, &["region", "regionMembership", "Region"])
                    .unwrap_or_else(|| UNKNOWN.to_owned());
            let ministry = resolve_string(
                &registrant_data,
                &["ministryMembership", "ministry", "Ministry"],
            )
            .unwrap_or_else(|| UNKNOWN.to_owned());

            let region_key = to_safe_key(&region);
            let ministry_key = to_safe_key(&ministry);

            *global_regions.entry(region_key.clone()).or_insert(0) += 1;
            *global_ministries.entry(ministry_key.clone()).or_insert(0) += 1;
            *hourly.entry(quarter_hour_bucket_id(ts)).or_insert(0) += 1;
            *session_regions.entry(region_key).or_insert(0) += 1;
            *session_ministries.entry(ministry_key).or_insert(0) += 1;

            let is_earliest = match &earliest_checkin {
                Some(existing) => ts < existing.timestamp,
                None => true,
            };

            if is_earliest {
                earliest_checkin = Some(EarliestCheckin {
                    registrant_id: registrant_id.clone(),
                    session_id: session_id.clone(),
                    timestamp: ts,
                });
            }

            if first_sighting {
                store
                    .apply(
                        paths::attendee_index(event_id, &registrant_id)?,
                        Patch::new()
                            .set("firstSession", &session_id)?
                            .set("firstCheckinTime", ts)?,
                    )
                    .await?;
            }
        }

        store
            .apply(
                paths::session_summary(event_id, &session_id)?,
                Patch::new()
                    .set("attendanceCount", attendance_count)?
                    .set("regionCounts", &session_regions)?
                    .set("ministryCounts", &session_ministries)?
                    .server_timestamp("lastUpdated"),
            )
            .await?;
    }

    let registrants = store.list(&paths::registrants(event_id)?).await?;
    let mut earliest_registration: Option<EarliestRegistration> = None;

    for registrant in &registrants {
        let data = registrant.data.clone().unwrap_or(Value::Null);

        if let Some(registered_at) = resolve_registered_at(&data) {
            let is_earliest = match &earliest_registration {
                Some(existing) => registered_at < existing.timestamp,
                None => true,
            };

            if is_earliest {
                earliest_registration = Some(EarliestRegistration {
                    registrant_id: registrant.path.id().to_owned(),
                    timestamp: registered_at,
                });
            }
        }
    }

    let report = BackfillReport {
        total_unique_attendees: seen_registrants.len() as i64,
        total_checkins,
        total_registrants: registrants.len() as i64,
        sessions_processed: sessions.len(),
    };

    store
        .apply(
            paths::global_analytics(event_id)?,
            Patch::new()
                .set("totalUniqueAttendees", report.total_unique_attendees)?
                .set("totalCheckins", report.total_checkins)?
                .set("totalRegistrants", report.total_registrants)?
                .set("regionCounts", &global_regions)?
                .set("ministryCounts", &global_ministries)?
                .set("hourlyCheckins", &hourly)?
                .set("earliestCheckin", &earliest_checkin)?
                .set("earliestRegistration", &earliest_registration)?
                .server_timestamp("lastUpdated"),
        )
        .await?;

    tracing::info!(
        event_id,
        total_unique_attendees = report.total_unique_attendees,
        total_checkins = report.total_checkins,
        sessions_processed = report.sessions_processed,
        "analytics backfill complete"
    );

    Ok(report)
}
