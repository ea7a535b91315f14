use chrono::Utc;
use serde_json::Value;
use tally_store::{Patch, Store};

use crate::{
    error::Result,
    model::{EarliestCheckin, FirstSessionEntry, GlobalAnalytics, OverviewStats, SessionSummary},
    normalize::{quarter_hour_bucket_id, to_safe_key},
    paths,
    resolve::{as_timestamp, resolve_string},
};

const UNKNOWN: &str = "Unknown";

/// Attendance record created, unified mode: feed the full analytics rollup.
///
/// One transaction covers the attendee index probe, the global analytics,
/// the session summary and the legacy overview session totals. The index
/// write and the `totalUniqueAttendees` increment commit together or not at
/// all; that pairing is what keeps the cross-session unique-attendee count
/// honest under replays of *other* registrants' records.
pub async fn on_attendance_create(
    store: &Store,
    event_id: &str,
    session_id: &str,
    registrant_id: &str,
    data: &Value,
) -> Result<()> {
    let checked_in_at = data.get("checkedInAt").and_then(as_timestamp);
    let ts = checked_in_at.unwrap_or_else(Utc::now);

    let registrant = store
        .get(&paths::registrant(event_id, registrant_id)?)
        .await?;
    let registrant_data = registrant.data.unwrap_or(Value::Null);
    let region = resolve_string(&registrant_data, &["region", "regionMembership", "Region"])
        .unwrap_or_else(|| UNKNOWN.to_owned());
    let ministry = resolve_string(
        &registrant_data,
        &["ministryMembership", "ministry", "Ministry"],
    )
    .unwrap_or_else(|| UNKNOWN.to_owned());

    let index_path = paths::attendee_index(event_id, registrant_id)?;
    let global_path = paths::global_analytics(event_id)?;
    let summary_path = paths::session_summary(event_id, session_id)?;
    let stats_path = paths::overview_stats(event_id)?;

    store
        .run_transaction(|mut tx| {
            let index_path = index_path.clone();
            let global_path = global_path.clone();
            let summary_path = summary_path.clone();
            let stats_path = stats_path.clone();
            let region = region.clone();
            let ministry = ministry.clone();

            async move {
                let index_snap = tx.get(&index_path).await?;
                let is_new_unique_attendee = !index_snap.exists();

                let global: GlobalAnalytics =
                    tx.get(&global_path).await?.to_data()?.unwrap_or_default();
                let summary: SessionSummary =
                    tx.get(&summary_path).await?.to_data()?.unwrap_or_default();

                let region_key = to_safe_key(&region);
                let ministry_key = to_safe_key(&ministry);
                let hour_key = quarter_hour_bucket_id(ts);

                let mut global_regions = global.region_counts;
                let mut global_ministries = global.ministry_counts;
                let mut hourly = global.hourly_checkins;
                *global_regions.entry(region_key.clone()).or_insert(0) += 1;
                *global_ministries.entry(ministry_key.clone()).or_insert(0) += 1;
                *hourly.entry(hour_key).or_insert(0) += 1;

                let mut summary_regions = summary.region_counts;
                let mut summary_ministries = summary.ministry_counts;
                *summary_regions.entry(region_key).or_insert(0) += 1;
                *summary_ministries.entry(ministry_key).or_insert(0) += 1;

                let is_earliest = match &global.earliest_checkin {
                    Some(existing) => ts < existing.timestamp,
                    None => true,
                };

                let mut global_patch = Patch::new()
                    .increment("totalCheckins", 1)
                    .set("regionCounts", &global_regions)?
                    .set("ministryCounts", &global_ministries)?
                    .set("hourlyCheckins", &hourly)?
                    .server_timestamp("lastUpdated");

                if is_new_unique_attendee {
                    global_patch = global_patch.increment("totalUniqueAttendees", 1);
                }

                if is_earliest {
                    global_patch = global_patch.set(
                        "earliestCheckin",
                        EarliestCheckin {
                            registrant_id: registrant_id.to_owned(),
                            session_id: session_id.to_owned(),
                            timestamp: ts,
                        },
                    )?;
                }

                tx.set(global_path, global_patch);
                tx.set(
                    summary_path,
                    Patch::new()
                        .increment("attendanceCount", 1)
                        .set("regionCounts", &summary_regions)?
                        .set("ministryCounts", &summary_ministries)?
                        .server_timestamp("lastUpdated"),
                );

                if is_new_unique_attendee {
                    tx.set(
                        index_path,
                        Patch::new()
                            .set("firstSession", session_id)?
                            .set("firstCheckinTime", ts)?,
                    );
                }

                // Legacy overview session totals, for dashboards still
                // reading stats/overview.
                let stats: OverviewStats =
                    tx.get(&stats_path).await?.to_data()?.unwrap_or_default();
                let mut session_totals = stats.session_totals;
                let mut first_session = stats.first_session_check_in;
                let session_key = to_safe_key(session_id);
                *session_totals.entry(session_key.clone()).or_insert(0) += 1;

                if !first_session.contains_key(&session_key) {
                    if let Some(at) = checked_in_at {
                        first_session.insert(
                            session_key,
                            FirstSessionEntry {
                                at,
                                registrant_id: registrant_id.to_owned(),
                            },
                        );
                    }
                }

                tx.set(
                    stats_path,
                    Patch::new()
                        .set("sessionTotals", &session_totals)?
                        .set("firstSessionCheckIn", &first_session)?
                        .server_timestamp("updatedAt"),
                );

                Ok((tx, ()))
            }
        })
        .await?;

    Ok(())
}

/// Attendance record created, legacy-split mode: session check-ins are
/// primarily tracked on the registrant document and aggregated by
/// [`on_registrant_check_in`](crate::on_registrant_check_in). An attendance
/// record whose session id the registrant already carries is redundant and
/// must not be counted again.
pub async fn on_attendance_create_legacy(
    store: &Store,
    event_id: &str,
    session_id: &str,
    registrant_id: &str,
    data: &Value,
) -> Result<()> {
    let registrant = store
        .get(&paths::registrant(event_id, registrant_id)?)
        .await?;

    let already_counted = registrant
        .field("sessionsCheckedIn")
        .and_then(Value::as_object)
        .is_some_and(|m| m.contains_key(session_id));

    if already_counted {
        tracing::debug!(
            event_id,
            session_id,
            registrant_id,
            "attendance already aggregated via registrant document"
        );
        return Ok(());
    }

    let ts = data
        .get("checkedInAt")
        .and_then(as_timestamp)
        .unwrap_or_else(Utc::now);
    let stats_path = paths::overview_stats(event_id)?;

    store
        .run_transaction(|mut tx| {
            let stats_path = stats_path.clone();

            async move {
                let stats: OverviewStats =
                    tx.get(&stats_path).await?.to_data()?.unwrap_or_default();
                let mut session_totals = stats.session_totals;
                let mut first_session = stats.first_session_check_in;
                let session_key = to_safe_key(session_id);
                *session_totals.entry(session_key.clone()).or_insert(0) += 1;

                first_session
                    .entry(session_key)
                    .or_insert_with(|| FirstSessionEntry {
                        at: ts,
                        registrant_id: registrant_id.to_owned(),
                    });

                tx.set(
                    stats_path,
                    Patch::new()
                        .set("sessionTotals", &session_totals)?
                        .set("firstSessionCheckIn", &first_session)?
                        .server_timestamp("updatedAt"),
                );

                Ok((tx, ()))
            }
        })
        .await?;

    Ok(())
}
