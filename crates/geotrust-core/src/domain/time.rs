// crates/geotrust-core/src/domain/time.rs
// ============================================================================
// Module: GeoTrust Time Model
// Description: Canonical timestamp representation for records and snapshots.
// Purpose: Provide deterministic time values across GeoTrust records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! GeoTrust uses explicit unix-millisecond timestamps embedded in records to
//! keep evaluation deterministic. The core never reads wall-clock time
//! directly; hosts must supply timestamps when writing registry entries,
//! capturing snapshots, or raising alerts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Milliseconds per minute used for grace-period arithmetic.
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Canonical timestamp used in GeoTrust records and snapshot history.
///
/// # Invariants
/// - Values are unix epoch milliseconds explicitly provided by callers.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns this timestamp shifted backwards by the given number of minutes.
    #[must_use]
    pub const fn minutes_before(self, minutes: u32) -> Self {
        Self(self.0.saturating_sub(minutes as i64 * MILLIS_PER_MINUTE))
    }

    /// Returns whole minutes elapsed between `earlier` and this timestamp.
    ///
    /// Saturates to zero when `earlier` is not actually earlier.
    #[must_use]
    pub const fn minutes_since(self, earlier: Self) -> i64 {
        let delta = self.0.saturating_sub(earlier.0);
        if delta <= 0 { 0 } else { delta / MILLIS_PER_MINUTE }
    }

    /// Renders the timestamp as an RFC 3339 string.
    ///
    /// Falls back to the raw millisecond value when the timestamp is outside
    /// the representable calendar range.
    #[must_use]
    pub fn rfc3339(self) -> String {
        let nanos = i128::from(self.0) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .and_then(|moment| moment.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rfc3339())
    }
}
