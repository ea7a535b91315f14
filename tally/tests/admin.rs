mod common;

use serde_json::json;
use tally::{
    admin::{ensure_stats, initialize_event, rebuild_analytics, Caller, EventBootstrap},
    Error, SessionSeed,
};

use crate::common::{doc, overview, seed, store, EVENT};

fn bootstrap() -> EventBootstrap {
    EventBootstrap {
        name: "National Leaders Conference 2026".to_owned(),
        venue: "Hyatt Regency Valencia".to_owned(),
        sessions: vec![
            SessionSeed {
                id: "opening-plenary".to_owned(),
                name: "Opening Plenary".to_owned(),
                location: "Grand Ballroom".to_owned(),
                order: 1,
            },
            SessionSeed {
                id: "mass".to_owned(),
                name: "Mass".to_owned(),
                location: "Main Chapel".to_owned(),
                order: 2,
            },
        ],
    }
}

async fn grant_role(store: &tally_store::Store, email: &str, role: &str) {
    seed(
        store,
        &format!("events/{EVENT}/admins/{email}"),
        &json!({ "role": role }),
    )
    .await;
}

#[tokio::test]
async fn anonymous_callers_are_rejected() {
    let store = store();

    let err = initialize_event(&store, EVENT, &Caller::Anonymous, &bootstrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));

    let err = rebuild_analytics(&store, EVENT, &Caller::Anonymous)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
}

#[tokio::test]
async fn non_admin_callers_are_rejected_without_partial_writes() {
    let store = store();
    grant_role(&store, "staff@example.org", "GUEST").await;

    let caller = Caller::authenticated("staff@example.org");
    let err = initialize_event(&store, EVENT, &caller, &bootstrap())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PermissionDenied(_)));
    assert!(!store
        .get(&doc(&format!("events/{EVENT}/stats/overview")))
        .await
        .unwrap()
        .exists());
}

#[tokio::test]
async fn missing_event_id_is_an_invalid_argument() {
    let store = store();

    let err = rebuild_analytics(&store, "", &Caller::authenticated("a@example.org"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn initialize_event_is_idempotent() {
    let store = store();
    grant_role(&store, "admin@example.org", "ADMIN").await;
    let caller = Caller::authenticated("admin@example.org");

    initialize_event(&store, EVENT, &caller, &bootstrap())
        .await
        .unwrap();
    initialize_event(&store, EVENT, &caller, &bootstrap())
        .await
        .unwrap();

    let event = store.get(&doc(&format!("events/{EVENT}"))).await.unwrap();
    assert_eq!(
        event.field("name"),
        Some(&json!("National Leaders Conference 2026"))
    );

    let session = store
        .get(&doc(&format!("events/{EVENT}/sessions/mass")))
        .await
        .unwrap();
    assert_eq!(session.field("location"), Some(&json!("Main Chapel")));

    let stats = overview(&store).await;
    assert_eq!(stats.total_registrations, 0);
    assert_eq!(stats.total_checked_in, 0);
}

#[tokio::test]
async fn ensure_stats_never_resets_live_counters() {
    let store = store();
    seed(
        &store,
        &format!("events/{EVENT}/stats/overview"),
        &json!({ "totalRegistrations": 42, "totalCheckedIn": 7 }),
    )
    .await;

    ensure_stats(&store, EVENT, &Caller::authenticated("any@example.org"))
        .await
        .unwrap();

    let stats = overview(&store).await;
    assert_eq!(stats.total_registrations, 42);
    assert_eq!(stats.total_checked_in, 7);
}

#[tokio::test]
async fn rebuild_requires_the_admin_or_staff_role() {
    let store = store();
    grant_role(&store, "staff@example.org", "STAFF").await;

    seed(
        &store,
        &format!("events/{EVENT}/sessions/mass"),
        &json!({ "name": "Mass" }),
    )
    .await;
    seed(
        &store,
        &format!("events/{EVENT}/sessions/mass/attendance/r1"),
        &json!({ "checkedInAt": "2026-03-07T10:00:00Z" }),
    )
    .await;

    let report = rebuild_analytics(&store, EVENT, &Caller::authenticated("staff@example.org"))
        .await
        .unwrap();

    assert_eq!(report.total_checkins, 1);
    assert_eq!(report.total_unique_attendees, 1);
}
