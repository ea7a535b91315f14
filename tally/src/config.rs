/// How attendance-record creation feeds the aggregates.
///
/// The two variants are alternative aggregation strategies for the same
/// physical event; running both against the same aggregate documents would
/// double count, so the choice is made once at deployment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionAggregationMode {
    /// Attendance records drive the full analytics rollup (global, session
    /// summary, attendee index) plus the legacy overview session totals.
    #[default]
    Unified,
    /// Session check-ins are tracked on the registrant document itself and
    /// aggregated there; attendance records only cover check-ins the
    /// registrant document has not already recorded.
    LegacySplit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub session_aggregation: SessionAggregationMode,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_aggregation(mut self, mode: SessionAggregationMode) -> Self {
        self.session_aggregation = mode;
        self
    }
}
