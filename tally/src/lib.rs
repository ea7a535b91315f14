//! Incremental check-in analytics for event registration data.
//!
//! Document mutations on registrants and session attendance records are
//! converted into idempotent deltas against a fixed set of aggregate
//! documents (overview stats, per-minute check-in buckets, global and
//! per-session analytics), without ever re-scanning the source collections
//! on the hot path. A full-scan [`backfill`] pass re-derives the same
//! aggregates for recovery and initial population.
//!
//! Delivery of document changes, authentication of administrative callers
//! and the document store itself are external collaborators; the store is
//! abstracted by [`tally_store::Store`].

#![forbid(unsafe_code)]

pub mod admin;
pub mod backfill;
pub mod paths;

mod attendance;
mod change;
mod config;
mod error;
mod model;
mod normalize;
mod processor;
mod rank;
mod registrant;
mod resolve;

pub use attendance::{on_attendance_create, on_attendance_create_legacy};
pub use change::{DocumentChange, Route};
pub use config::{Config, SessionAggregationMode};
pub use error::{Error, Result};
pub use model::*;
pub use normalize::{minute_bucket_id, normalize_free_text, quarter_hour_bucket_id, to_safe_key};
pub use processor::Processor;
pub use rank::top5;
pub use registrant::{on_registrant_check_in, on_registrant_create};
pub use resolve::{as_timestamp, resolve_early_bird, resolve_registered_at, resolve_string};
