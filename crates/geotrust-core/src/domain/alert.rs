// crates/geotrust-core/src/domain/alert.rs
// ============================================================================
// Module: GeoTrust Alerts
// Description: Deduplicated, lifecycle-tracked alerts raised from SLO failures.
// Purpose: Define the alert record and its OPEN -> ACKNOWLEDGED -> RESOLVED lifecycle.
// Dependencies: crate::domain::{identifiers, slo, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! Alerts are created by the alerting engine for failing SLOs, deduplicated
//! within the SLO's grace period, and tracked through an explicit lifecycle.
//! Acknowledgement requires an operator identity; resolution may be manual or
//! automatic on a subsequent passing evaluation. Resolved alerts are purged
//! by retention cleanup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::domain::identifiers::SloName;
use crate::domain::slo::SloOperator;
use crate::domain::slo::SloSeverity;
use crate::domain::time::Timestamp;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Alert identifier assigned at creation.
///
/// # Invariants
/// - Opaque UTF-8 string, unique within the alert store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    /// Creates a new alert identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Operator identity recorded on acknowledgement.
///
/// # Invariants
/// - Opaque UTF-8 string; must be non-empty at the acknowledge boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    /// Creates a new operator identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Alert lifecycle state.
///
/// # Invariants
/// - Transitions only move forward: open -> acknowledged -> resolved, with
///   open -> resolved permitted for automatic resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    /// Raised and awaiting operator attention.
    Open,
    /// Seen by an operator; still unresolved.
    Acknowledged,
    /// Closed, manually or by a passing evaluation.
    Resolved,
}

impl AlertState {
    /// Returns the stable label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

/// Invalid alert lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid alert transition: {from} -> {to}")]
pub struct AlertTransitionError {
    /// Current state label.
    pub from: &'static str,
    /// Requested state label.
    pub to: &'static str,
}

// ============================================================================
// SECTION: Alert Record
// ============================================================================

/// Lifecycle-tracked alert raised from a failing SLO evaluation.
///
/// # Invariants
/// - `severity` is inherited from the SLO definition at creation.
/// - Acknowledgement fields are set together, exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identifier.
    pub alert_id: AlertId,
    /// Failing SLO name.
    pub slo_name: SloName,
    /// Creation timestamp.
    pub triggered_at: Timestamp,
    /// Measured value at creation, when available.
    pub current_value: Option<f64>,
    /// Configured target value.
    pub target_value: f64,
    /// Severity inherited from the SLO definition.
    pub severity: SloSeverity,
    /// Templated human-readable message.
    pub message: String,
    /// Lifecycle state.
    pub state: AlertState,
    /// Operator who acknowledged the alert.
    pub acknowledged_by: Option<OperatorId>,
    /// Acknowledgement timestamp.
    pub acknowledged_at: Option<Timestamp>,
    /// Resolution timestamp.
    pub resolved_at: Option<Timestamp>,
}

impl Alert {
    /// Renders the templated alert message for a failing SLO.
    #[must_use]
    pub fn render_message(
        slo_name: &SloName,
        current: Option<f64>,
        operator: SloOperator,
        target: f64,
    ) -> String {
        match current {
            Some(current) => format!(
                "SLO '{slo_name}' failing: current {current} violates '{operator} {target}'"
            ),
            None => format!("SLO '{slo_name}' failing: metric unavailable (target {target})"),
        }
    }

    /// Transitions the alert to acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`AlertTransitionError`] unless the alert is currently open.
    pub fn acknowledge(
        &mut self,
        operator: OperatorId,
        at: Timestamp,
    ) -> Result<(), AlertTransitionError> {
        if self.state != AlertState::Open {
            return Err(AlertTransitionError {
                from: self.state.as_str(),
                to: AlertState::Acknowledged.as_str(),
            });
        }
        self.state = AlertState::Acknowledged;
        self.acknowledged_by = Some(operator);
        self.acknowledged_at = Some(at);
        Ok(())
    }

    /// Transitions the alert to resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AlertTransitionError`] when the alert is already resolved.
    pub fn resolve(&mut self, at: Timestamp) -> Result<(), AlertTransitionError> {
        if self.state == AlertState::Resolved {
            return Err(AlertTransitionError {
                from: self.state.as_str(),
                to: AlertState::Resolved.as_str(),
            });
        }
        self.state = AlertState::Resolved;
        self.resolved_at = Some(at);
        Ok(())
    }

    /// Returns true while the alert participates in deduplication.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        !matches!(self.state, AlertState::Resolved)
    }
}
