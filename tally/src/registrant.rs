use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tally_store::{Patch, Store};

use crate::{
    error::Result,
    model::{CheckinBucket, FirstSessionEntry, OverviewStats},
    normalize::{minute_bucket_id, normalize_free_text, to_safe_key},
    paths,
    rank::top5,
    resolve::{as_timestamp, resolve_early_bird, resolve_registered_at, resolve_string},
};

const UNKNOWN: &str = "Unknown";

/// Registrant created: bump `totalRegistrations` (and the early-bird
/// counters) on the overview stats, and `totalRegistrants` on the global
/// analytics, in one transaction.
///
/// Creation events are assumed non-repeating per registrant id; a
/// redelivered create double counts. That gap belongs to the delivery
/// layer, not here.
pub async fn on_registrant_create(
    store: &Store,
    event_id: &str,
    registrant_id: &str,
    data: &Value,
) -> Result<()> {
    let stats_path = paths::overview_stats(event_id)?;
    let global_path = paths::global_analytics(event_id)?;
    let registered_at = resolve_registered_at(data);
    let early_bird = resolve_early_bird(data);

    store
        .run_transaction(|mut tx| {
            let stats_path = stats_path.clone();
            let global_path = global_path.clone();

            async move {
                let snap = tx.get(&stats_path).await?;
                let stats: OverviewStats = snap.to_data()?.unwrap_or_default();

                let mut patch = Patch::new()
                    .increment("totalRegistrations", 1)
                    .server_timestamp("updatedAt");

                // First writer creates the defaults; avoids a separate
                // ensure-exists step racing with the increment.
                if !snap.exists() {
                    patch = patch.set("totalCheckedIn", 0)?.set("earlyBirdCount", 0)?;
                }

                if early_bird {
                    patch = patch.increment("earlyBirdCount", 1);

                    if let Some(registered_at) = registered_at {
                        let wins = match stats.first_early_bird_registered_at {
                            Some(existing) => registered_at < existing,
                            None => true,
                        };

                        if wins {
                            patch = patch
                                .set("firstEarlyBirdRegisteredAt", registered_at)?
                                .set("firstEarlyBirdRegistrantId", registrant_id)?;
                        }
                    }
                }

                tx.set(stats_path, patch);
                tx.set(
                    global_path,
                    Patch::new()
                        .increment("totalRegistrants", 1)
                        .server_timestamp("lastUpdated"),
                );

                Ok((tx, ()))
            }
        })
        .await?;

    Ok(())
}

fn checked_in_at(record: &Value) -> Option<&Value> {
    record
        .pointer("/eventAttendance/checkedInAt")
        .filter(|v| !v.is_null())
}

fn session_keys(record: &Value) -> BTreeSet<String> {
    record
        .get("sessionsCheckedIn")
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

/// Registrant updated: derive the two replay-safe signals — the event
/// check-in edge (`eventAttendance.checkedInAt` null → set) and the set of
/// newly added `sessionsCheckedIn` keys — and apply their deltas to the
/// overview stats. Updates that fire neither signal touch nothing.
pub async fn on_registrant_check_in(
    store: &Store,
    event_id: &str,
    registrant_id: &str,
    before: &Value,
    after: &Value,
) -> Result<()> {
    let is_event_check_in = checked_in_at(before).is_none() && checked_in_at(after).is_some();
    let event_ts = checked_in_at(after).and_then(as_timestamp);

    let before_keys = session_keys(before);
    let after_keys = session_keys(after);
    let added_sessions: Vec<&String> = after_keys.difference(&before_keys).collect();

    if !is_event_check_in && added_sessions.is_empty() {
        tracing::debug!(event_id, registrant_id, "registrant update without check-in signal");
        return Ok(());
    }

    let stats_path = paths::overview_stats(event_id)?;
    let region = resolve_string(after, &["region", "regionMembership", "Region"])
        .unwrap_or_else(|| UNKNOWN.to_owned());
    let region_other = resolve_string(after, &["regionOtherText", "regionOther"]);
    let ministry = resolve_string(after, &["ministryMembership", "ministry", "Ministry"])
        .unwrap_or_else(|| UNKNOWN.to_owned());
    let service = resolve_string(after, &["service"]).unwrap_or_else(|| UNKNOWN.to_owned());
    let early_bird = resolve_early_bird(after);

    store
        .run_transaction(|mut tx| {
            let stats_path = stats_path.clone();
            let region = region.clone();
            let region_other = region_other.clone();
            let ministry = ministry.clone();
            let service = service.clone();
            let added_sessions = added_sessions.clone();

            async move {
                let snap = tx.get(&stats_path).await?;
                let stats: OverviewStats = snap.to_data()?.unwrap_or_default();

                let mut region_counts = stats.region_counts;
                let mut ministry_counts = stats.ministry_counts;
                let mut service_counts = stats.service_counts;
                let mut session_totals = stats.session_totals;
                let mut region_other_counts = stats.region_other_text_counts;
                let mut first_session = stats.first_session_check_in;

                if is_event_check_in {
                    *region_counts.entry(to_safe_key(&region)).or_insert(0) += 1;
                    *ministry_counts.entry(to_safe_key(&ministry)).or_insert(0) += 1;
                    *service_counts.entry(to_safe_key(&service)).or_insert(0) += 1;

                    if let Some(other) = &region_other {
                        let key = to_safe_key(&normalize_free_text(other));
                        *region_other_counts.entry(key).or_insert(0) += 1;
                    }
                }

                for session_id in &added_sessions {
                    let key = to_safe_key(session_id);
                    *session_totals.entry(key.clone()).or_insert(0) += 1;

                    if !first_session.contains_key(&key) {
                        let ts = after
                            .get("sessionsCheckedIn")
                            .and_then(|m| m.get(session_id.as_str()))
                            .and_then(as_timestamp)
                            .or(event_ts);

                        if let Some(at) = ts {
                            first_session.insert(
                                key,
                                FirstSessionEntry {
                                    at,
                                    registrant_id: registrant_id.to_owned(),
                                },
                            );
                        }
                    }
                }

                let mut patch = Patch::new()
                    .set("regionCounts", &region_counts)?
                    .set("ministryCounts", &ministry_counts)?
                    .set("serviceCounts", &service_counts)?
                    .set("sessionTotals", &session_totals)?
                    .set("regionOtherTextCounts", &region_other_counts)?
                    .set("firstSessionCheckIn", &first_session)?
                    .set("top5Regions", top5(&region_counts))?
                    .set("top5Ministries", top5(&ministry_counts))?
                    .set("top5Services", top5(&service_counts))?
                    .set("top5RegionOtherText", top5(&region_other_counts))?
                    .server_timestamp("updatedAt");

                if is_event_check_in {
                    patch = patch.increment("totalCheckedIn", 1);

                    if early_bird {
                        patch = patch.increment("earlyBirdCount", 1);
                    }

                    if stats.first_check_in_at.is_none() {
                        if let Some(ts) = event_ts {
                            patch = patch
                                .set("firstCheckInAt", ts)?
                                .set("firstCheckInRegistrantId", registrant_id)?;
                        }
                    }
                }

                tx.set(stats_path, patch);

                Ok((tx, ()))
            }
        })
        .await?;

    // The per-minute bucket lives outside the stats transaction; the peak
    // comparison below is read-after-write across two documents and only
    // eventually consistent under concurrent same-minute check-ins.
    if is_event_check_in {
        if let Some(ts) = event_ts {
            record_checkin_bucket(store, event_id, ts).await?;
        }
    }

    Ok(())
}

async fn record_checkin_bucket(store: &Store, event_id: &str, ts: DateTime<Utc>) -> Result<()> {
    let bucket_id = minute_bucket_id(ts);
    let bucket_path = paths::checkin_bucket(event_id, &bucket_id)?;

    store
        .apply(bucket_path.clone(), Patch::new().increment("count", 1))
        .await?;

    let bucket: CheckinBucket = store
        .get(&bucket_path)
        .await?
        .to_data()?
        .unwrap_or_default();

    let stats_path = paths::overview_stats(event_id)?;
    let stats: OverviewStats = store
        .get(&stats_path)
        .await?
        .to_data()?
        .unwrap_or_default();

    if bucket.count > stats.peak_minute_count {
        store
            .apply(
                stats_path,
                Patch::new()
                    .set("peakMinuteBucketId", &bucket_id)?
                    .set("peakMinuteCount", bucket.count)?
                    .set("peakCheckInMinute", &bucket_id)?
                    .server_timestamp("updatedAt"),
            )
            .await?;
    }

    Ok(())
}
