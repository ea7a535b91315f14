mod common;

use serde_json::json;
use tally::Processor;

use crate::common::{fire_created, fire_updated, overview, store, ts, EVENT};

fn registrant_path(id: &str) -> String {
    format!("events/{EVENT}/registrants/{id}")
}

#[tokio::test]
async fn early_bird_registration() {
    let store = store();
    let processor = Processor::new(store.clone());

    fire_created(
        &processor,
        &registrant_path("r1"),
        json!({
            "isEarlyBird": true,
            "registeredAt": "2026-01-10T09:00:00Z",
            "region": "West",
        }),
    )
    .await;

    let stats = overview(&store).await;

    assert_eq!(stats.total_registrations, 1);
    assert_eq!(stats.early_bird_count, 1);
    assert_eq!(stats.total_checked_in, 0);
    assert_eq!(
        stats.first_early_bird_registered_at,
        Some(ts("2026-01-10T09:00:00Z"))
    );
    assert_eq!(stats.first_early_bird_registrant_id, Some("r1".to_owned()));
}

#[tokio::test]
async fn earliest_early_bird_wins_regardless_of_order() {
    let store = store();
    let processor = Processor::new(store.clone());

    // Later registration processed first.
    fire_created(
        &processor,
        &registrant_path("r2"),
        json!({ "isEarlyBird": "yes", "registeredAt": "2026-01-12T09:00:00Z" }),
    )
    .await;
    fire_created(
        &processor,
        &registrant_path("r1"),
        json!({ "isEarlyBird": true, "registeredAt": "2026-01-10T09:00:00Z" }),
    )
    .await;

    let stats = overview(&store).await;

    assert_eq!(stats.total_registrations, 2);
    assert_eq!(stats.early_bird_count, 2);
    assert_eq!(
        stats.first_early_bird_registered_at,
        Some(ts("2026-01-10T09:00:00Z"))
    );
    assert_eq!(stats.first_early_bird_registrant_id, Some("r1".to_owned()));
}

#[tokio::test]
async fn event_check_in_edge() {
    let store = store();
    let processor = Processor::new(store.clone());

    let before = json!({
        "region": "West",
        "eventAttendance": { "checkedInAt": null },
    });
    let after = json!({
        "region": "West",
        "eventAttendance": { "checkedInAt": "2026-03-07T08:30:00Z" },
    });

    fire_updated(&processor, &registrant_path("r1"), before, after).await;

    let stats = overview(&store).await;

    assert_eq!(stats.total_checked_in, 1);
    assert_eq!(stats.region_counts.get("West"), Some(&1));
    assert_eq!(stats.ministry_counts.get("Unknown"), Some(&1));
    assert_eq!(stats.top5_regions.len(), 1);
    assert_eq!(stats.top5_regions[0].name, "West");
    assert_eq!(stats.top5_regions[0].count, 1);
    assert_eq!(stats.first_check_in_at, Some(ts("2026-03-07T08:30:00Z")));
    assert_eq!(stats.first_check_in_registrant_id, Some("r1".to_owned()));
}

#[tokio::test]
async fn session_key_addition_does_not_refire_event_branch() {
    let store = store();
    let processor = Processor::new(store.clone());

    let checked_in = json!({
        "region": "West",
        "eventAttendance": { "checkedInAt": "2026-03-07T08:30:00Z" },
        "sessionsCheckedIn": {},
    });

    fire_updated(
        &processor,
        &registrant_path("r1"),
        json!({ "region": "West", "eventAttendance": { "checkedInAt": null } }),
        checked_in.clone(),
    )
    .await;

    let mut with_session = checked_in.clone();
    with_session["sessionsCheckedIn"] = json!({ "plenary": "2026-03-07T09:00:00Z" });

    fire_updated(
        &processor,
        &registrant_path("r1"),
        checked_in,
        with_session,
    )
    .await;

    let stats = overview(&store).await;

    assert_eq!(stats.total_checked_in, 1, "event branch must not re-fire");
    assert_eq!(stats.session_totals.get("plenary"), Some(&1));
    let first = stats.first_session_check_in.get("plenary").unwrap();
    assert_eq!(first.at, ts("2026-03-07T09:00:00Z"));
    assert_eq!(first.registrant_id, "r1");
}

#[tokio::test]
async fn replay_of_unchanged_state_is_a_no_op() {
    let store = store();
    let processor = Processor::new(store.clone());

    let settled = json!({
        "region": "East",
        "eventAttendance": { "checkedInAt": "2026-03-07T08:30:00Z" },
        "sessionsCheckedIn": { "plenary": "2026-03-07T09:00:00Z" },
    });

    fire_updated(
        &processor,
        &registrant_path("r1"),
        json!({ "eventAttendance": { "checkedInAt": null } }),
        settled.clone(),
    )
    .await;

    let snapshot = overview(&store).await;

    // Same state delivered again: nothing may move, including updatedAt.
    fire_updated(
        &processor,
        &registrant_path("r1"),
        settled.clone(),
        settled,
    )
    .await;

    let replayed = overview(&store).await;

    assert_eq!(replayed.total_checked_in, snapshot.total_checked_in);
    assert_eq!(replayed.region_counts, snapshot.region_counts);
    assert_eq!(replayed.session_totals, snapshot.session_totals);
    assert_eq!(replayed.updated_at, snapshot.updated_at);
}

#[tokio::test]
async fn totals_count_distinct_check_in_edges_under_any_interleaving() {
    let store = store();
    let processor = Processor::new(store.clone());

    // Five registrants, edges delivered out of order, one delivered twice
    // with no state change in between.
    for id in ["r3", "r1", "r5", "r2", "r4"] {
        let before = json!({ "eventAttendance": { "checkedInAt": null } });
        let after = json!({
            "region": "West",
            "eventAttendance": { "checkedInAt": "2026-03-07T08:30:00Z" },
        });

        fire_updated(&processor, &registrant_path(id), before, after.clone()).await;

        if id == "r1" {
            fire_updated(&processor, &registrant_path(id), after.clone(), after).await;
        }
    }

    let stats = overview(&store).await;

    assert_eq!(stats.total_checked_in, 5);
    assert_eq!(stats.region_counts.get("West"), Some(&5));
}

#[tokio::test]
async fn dotted_region_names_are_escaped_in_map_keys() {
    let store = store();
    let processor = Processor::new(store.clone());

    fire_updated(
        &processor,
        &registrant_path("r1"),
        json!({ "eventAttendance": { "checkedInAt": null } }),
        json!({
            "region": "St. Mary's",
            "regionOtherText": "  Far   NORTH ",
            "eventAttendance": { "checkedInAt": "2026-03-07T08:30:00Z" },
        }),
    )
    .await;

    let stats = overview(&store).await;

    assert_eq!(stats.region_counts.get("St_ Mary's"), Some(&1));
    assert_eq!(stats.region_other_text_counts.get("far north"), Some(&1));
}

#[tokio::test]
async fn first_check_in_marker_is_set_once() {
    let store = store();
    let processor = Processor::new(store.clone());

    for (id, at) in [("r1", "2026-03-07T08:30:00Z"), ("r2", "2026-03-07T07:00:00Z")] {
        fire_updated(
            &processor,
            &registrant_path(id),
            json!({ "eventAttendance": { "checkedInAt": null } }),
            json!({ "eventAttendance": { "checkedInAt": at } }),
        )
        .await;
    }

    let stats = overview(&store).await;

    // firstCheckInAt records the first edge that was durably applied.
    assert_eq!(stats.first_check_in_at, Some(ts("2026-03-07T08:30:00Z")));
    assert_eq!(stats.first_check_in_registrant_id, Some("r1".to_owned()));
}
