//! Administrative operations: idempotent aggregate initialization and the
//! full rebuild. Callers are authenticated upstream; this module only
//! enforces the role check against the event's admin roster.

use serde_json::json;
use tally_store::{Patch, Store};

use crate::{
    backfill::{backfill_analytics, BackfillReport},
    error::{Error, Result},
    model::SessionSeed,
    paths,
};

/// Identity of an administrative caller, as established by the external
/// authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated { email: Option<String> },
}

impl Caller {
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self::Authenticated {
            email: Some(email.into()),
        }
    }
}

/// Bootstrap shape for a new event.
#[derive(Debug, Clone)]
pub struct EventBootstrap {
    pub name: String,
    pub venue: String,
    pub sessions: Vec<SessionSeed>,
}

fn require_authenticated(caller: &Caller) -> Result<Option<&str>> {
    match caller {
        Caller::Anonymous => Err(Error::Unauthenticated),
        Caller::Authenticated { email } => Ok(email.as_deref()),
    }
}

async fn require_admin<'a>(store: &Store, event_id: &str, caller: &'a Caller) -> Result<&'a str> {
    let email = require_authenticated(caller)?
        .ok_or_else(|| Error::PermissionDenied("no email".to_owned()))?;

    let role_doc = store.get(&paths::admin_role(event_id, email)?).await?;
    let role = role_doc
        .field("role")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    if role_doc.exists() && (role == "ADMIN" || role == "STAFF") {
        Ok(email)
    } else {
        Err(Error::PermissionDenied(
            "only admins may run this operation".to_owned(),
        ))
    }
}

/// Write the all-zero overview shape only when the document is missing;
/// counters already accumulated by the mutators are never reset.
async fn ensure_stats_doc(store: &Store, event_id: &str) -> Result<()> {
    let stats_path = paths::overview_stats(event_id)?;

    if !store.get(&stats_path).await?.exists() {
        store.apply(stats_path, initial_stats_patch()?).await?;
    }

    Ok(())
}

fn initial_stats_patch() -> Result<Patch> {
    Ok(Patch::new()
        .set("totalRegistrations", 0)?
        .set("totalCheckedIn", 0)?
        .set("earlyBirdCount", 0)?
        .set("regionCounts", json!({}))?
        .set("regionOtherTextCounts", json!({}))?
        .set("ministryCounts", json!({}))?
        .set("serviceCounts", json!({}))?
        .set("sessionTotals", json!({}))?
        .set("firstCheckInAt", json!(null))?
        .set("firstCheckInRegistrantId", json!(null))?
        .server_timestamp("updatedAt"))
}

/// Idempotent merge-create of the event document, its bootstrap sessions
/// and the initial overview stats. Admin only.
pub async fn initialize_event(
    store: &Store,
    event_id: &str,
    caller: &Caller,
    bootstrap: &EventBootstrap,
) -> Result<()> {
    let email = require_admin(store, event_id, caller).await?;

    let event_path = paths::event(event_id)?;
    let event_doc = store.get(&event_path).await?;

    let event_patch = if event_doc.exists() {
        Patch::new().set(
            "metadata",
            json!({ "selfCheckinEnabled": true, "sessionsEnabled": true }),
        )?
    } else {
        Patch::new()
            .set("name", &bootstrap.name)?
            .set("venue", &bootstrap.venue)?
            .set("isActive", true)?
            .set(
                "metadata",
                json!({ "selfCheckinEnabled": true, "sessionsEnabled": true }),
            )?
            .server_timestamp("createdAt")
    };

    store.apply(event_path, event_patch).await?;

    for session in &bootstrap.sessions {
        store
            .apply(
                paths::session(event_id, &session.id)?,
                Patch::new()
                    .set("name", &session.name)?
                    .set("location", &session.location)?
                    .set("order", session.order)?
                    .set("isActive", true)?,
            )
            .await?;
    }

    ensure_stats_doc(store, event_id).await?;

    tracing::info!(event_id, email, "event initialized");

    Ok(())
}

/// Merge the initial overview stats shape so the document exists before any
/// mutator touches it. Authenticated callers only.
pub async fn ensure_stats(store: &Store, event_id: &str, caller: &Caller) -> Result<()> {
    require_authenticated(caller)?;

    if event_id.is_empty() {
        return Err(Error::InvalidArgument("eventId required".to_owned()));
    }

    ensure_stats_doc(store, event_id).await
}

/// Recompute every analytics aggregate from the source collections. Admin
/// only; see [`backfill_analytics`](crate::backfill::backfill_analytics).
pub async fn rebuild_analytics(
    store: &Store,
    event_id: &str,
    caller: &Caller,
) -> Result<BackfillReport> {
    require_authenticated(caller)?;

    if event_id.is_empty() {
        return Err(Error::InvalidArgument("eventId required".to_owned()));
    }

    require_admin(store, event_id, caller).await?;

    backfill_analytics(store, event_id).await
}
