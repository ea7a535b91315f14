use tally_store::Store;

use crate::{
    attendance::{on_attendance_create, on_attendance_create_legacy},
    change::{DocumentChange, Route},
    config::{Config, SessionAggregationMode},
    error::Result,
    registrant::{on_registrant_check_in, on_registrant_create},
};

/// Routes document changes to the aggregate mutators.
///
/// Invocations are independent and unordered relative to each other; every
/// consistency requirement is carried by the per-document transactions the
/// mutators run, not by this dispatch.
#[derive(Clone)]
pub struct Processor {
    store: Store,
    config: Config,
}

impl Processor {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            config: Config::default(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn handle(&self, change: DocumentChange) -> Result<()> {
        let Some(route) = Route::of(change.path()) else {
            tracing::debug!(path = %change.path(), "change outside source collections, ignoring");
            return Ok(());
        };

        match (route, change) {
            (
                Route::Registrant {
                    event_id,
                    registrant_id,
                },
                DocumentChange::Created { data, .. },
            ) => on_registrant_create(&self.store, &event_id, &registrant_id, &data).await,
            (
                Route::Registrant {
                    event_id,
                    registrant_id,
                },
                DocumentChange::Updated { before, after, .. },
            ) => {
                on_registrant_check_in(&self.store, &event_id, &registrant_id, &before, &after)
                    .await
            }
            (
                Route::Attendance {
                    event_id,
                    session_id,
                    registrant_id,
                },
                DocumentChange::Created { data, .. },
            ) => match self.config.session_aggregation {
                SessionAggregationMode::Unified => {
                    on_attendance_create(&self.store, &event_id, &session_id, &registrant_id, &data)
                        .await
                }
                SessionAggregationMode::LegacySplit => {
                    on_attendance_create_legacy(
                        &self.store,
                        &event_id,
                        &session_id,
                        &registrant_id,
                        &data,
                    )
                    .await
                }
            },
            (Route::Attendance { .. }, DocumentChange::Updated { path, .. }) => {
                tracing::debug!(%path, "attendance records are immutable, ignoring update");
                Ok(())
            }
        }
    }
}
