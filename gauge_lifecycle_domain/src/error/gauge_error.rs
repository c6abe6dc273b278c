// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Error Types
//!
//! This module defines the error taxonomy for the gauge lifecycle domain.
//! Every core operation returns exactly one of a success value or a
//! [`GaugeError`]; errors are never swallowed, and the error kind uniquely
//! determines recoverability for the routing layer.
//!
//! ## Categories
//!
//! - **Validation errors**: rejected before any write (`ValidationError`)
//! - **Authorization errors**: `PermissionDenied` with the missing capability
//! - **Lifecycle errors**: `IllegalTransition`, `PreconditionFailed`
//! - **Invariant violations**: indicate a bug or data corruption; the engine
//!   additionally records a critical audit entry and raises an alert event
//! - **Concurrency errors**: `Conflict`, `AlreadyCheckedOut`
//! - **Workflow signals**: `AwaitingCompanionCertificate`, `SetIdReused`
//! - **Infrastructure errors**: `DatabaseError`, `Timeout`, `Transient`
//!
//! Only `Transient` is retried inside the engine (bounded, with backoff);
//! all other kinds surface unchanged to the caller.

use thiserror::Error;

/// Core error type for gauge lifecycle operations.
///
/// Each variant represents a specific failure mode with enough context for
/// the caller to act on it. The boundary taxonomy (spelled out in the
/// routing layer's contract) maps one-to-one onto these variants.
#[derive(Error, Debug, Clone)]
pub enum GaugeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: missing capability {0}")]
    PermissionDenied(String),

    #[error("Illegal transition from {from} to {to}: {reason}")]
    IllegalTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Already checked out: {0}")]
    AlreadyCheckedOut(String),

    #[error("Awaiting companion certificate: {0}")]
    AwaitingCompanionCertificate(String),

    #[error("Set id has already been used: {0}")]
    SetIdReused(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Transient database error: {0}")]
    Transient(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GaugeError {
    /// Creates a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a new permission-denied error carrying the missing capability
    pub fn permission_denied(capability: impl Into<String>) -> Self {
        Self::PermissionDenied(capability.into())
    }

    /// Creates a new illegal-transition error
    pub fn illegal_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::IllegalTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new precondition-failed error
    pub fn precondition_failed(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    /// Creates a new invariant-violation error
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Creates a new conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Creates a new validation error
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a new transient error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether the engine may retry the failed transaction.
    ///
    /// Only transient database failures (deadlock, lock-wait, connection
    /// loss) qualify; constraint violations and illegal transitions never do.
    pub fn is_transient(&self) -> bool {
        matches!(self, GaugeError::Transient(_))
    }

    /// Whether the caller can reasonably retry the whole operation later.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GaugeError::Transient(_) | GaugeError::Timeout(_) | GaugeError::Conflict(_)
        )
    }

    /// Whether the error is security-relevant and must be audited at
    /// critical severity.
    pub fn is_security_error(&self) -> bool {
        matches!(
            self,
            GaugeError::PermissionDenied(_) | GaugeError::InvariantViolation(_)
        )
    }

    /// Short stable kind name, used in audit payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GaugeError::NotFound(_) => "not_found",
            GaugeError::PermissionDenied(_) => "permission_denied",
            GaugeError::IllegalTransition { .. } => "illegal_transition",
            GaugeError::PreconditionFailed(_) => "precondition_failed",
            GaugeError::InvariantViolation(_) => "invariant_violation",
            GaugeError::AlreadyCheckedOut(_) => "already_checked_out",
            GaugeError::AwaitingCompanionCertificate(_) => "awaiting_companion_certificate",
            GaugeError::SetIdReused(_) => "set_id_reused",
            GaugeError::Conflict(_) => "conflict",
            GaugeError::Timeout(_) => "timeout",
            GaugeError::Transient(_) => "transient",
            GaugeError::ValidationError(_) => "validation_error",
            GaugeError::DatabaseError(_) => "database_error",
            GaugeError::SerializationError(_) => "serialization_error",
            GaugeError::Cancelled(_) => "cancelled",
            GaugeError::InternalError(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_is_the_only_retryable_kind() {
        assert!(GaugeError::transient("db busy").is_transient());
        assert!(!GaugeError::timeout("query").is_transient());
        assert!(!GaugeError::conflict("row changed").is_transient());
        assert!(!GaugeError::illegal_transition("retired", "available", "terminal").is_transient());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(GaugeError::transient("x").is_recoverable());
        assert!(GaugeError::timeout("x").is_recoverable());
        assert!(GaugeError::conflict("x").is_recoverable());
        assert!(!GaugeError::invariant_violation("x").is_recoverable());
        assert!(!GaugeError::permission_denied("gauge.manage").is_recoverable());
    }

    #[test]
    fn test_security_errors_flagged() {
        assert!(GaugeError::permission_denied("system.admin").is_security_error());
        assert!(GaugeError::invariant_violation("companion mismatch").is_security_error());
        assert!(!GaugeError::not_found("gauge 42").is_security_error());
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = GaugeError::illegal_transition("available", "pending_release", "no certificate");
        assert_eq!(
            err.to_string(),
            "Illegal transition from available to pending_release: no certificate"
        );
        assert_eq!(err.kind(), "illegal_transition");
    }
}
