use serde_json::Value;
use tally_store::DocPath;

/// A document mutation as delivered by the change-feed layer. Delivery is
/// at-least-once; every handler downstream is written to survive replays of
/// unchanged state.
#[derive(Debug, Clone)]
pub enum DocumentChange {
    Created {
        path: DocPath,
        data: Value,
    },
    Updated {
        path: DocPath,
        before: Value,
        after: Value,
    },
}

impl DocumentChange {
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Created { path, .. } | Self::Updated { path, .. } => path,
        }
    }
}

/// Source documents the aggregation core reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Registrant {
        event_id: String,
        registrant_id: String,
    },
    Attendance {
        event_id: String,
        session_id: String,
        registrant_id: String,
    },
}

impl Route {
    /// Recognize `events/{e}/registrants/{r}` and
    /// `events/{e}/sessions/{s}/attendance/{r}`. Anything else, aggregate
    /// documents included, is not routed.
    pub fn of(path: &DocPath) -> Option<Self> {
        let segments: Vec<&str> = path.segments().collect();

        match segments.as_slice() {
            ["events", event_id, "registrants", registrant_id] => Some(Self::Registrant {
                event_id: (*event_id).to_owned(),
                registrant_id: (*registrant_id).to_owned(),
            }),
            ["events", event_id, "sessions", session_id, "attendance", registrant_id] => {
                Some(Self::Attendance {
                    event_id: (*event_id).to_owned(),
                    session_id: (*session_id).to_owned(),
                    registrant_id: (*registrant_id).to_owned(),
                })
            }
            _ => None,
        }
    }
}
