// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Authorization Gate
//!
//! Capability enforcement over a verified caller record. Authentication is
//! an external concern; the engine receives `{user_id, role, permissions}`
//! as fact and checks it on every operation. Denials never pass silently;
//! they surface as `PermissionDenied` naming the missing capability, and
//! the engine records them at critical severity.
//!
//! The user-management rules need one piece of global state the engine does
//! not own (how many system administrators exist); callers supply that
//! count, keeping the gate pure.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::value_objects::Capability;
use crate::GaugeError;

/// Caller role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
    SystemAdmin,
}

/// A verified caller identity with its resolved permission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    user_id: String,
    role: Role,
    permissions: HashSet<Capability>,
}

impl Caller {
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        permissions: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// `system.admin` implies every other capability.
    pub fn has(&self, capability: Capability) -> bool {
        self.permissions.contains(&capability)
            || self.permissions.contains(&Capability::SystemAdmin)
    }

    pub fn is_system_admin(&self) -> bool {
        self.permissions.contains(&Capability::SystemAdmin) || self.role == Role::SystemAdmin
    }
}

/// Stateless capability checks shared by every application service.
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Requires a capability, with `PermissionDenied` naming it otherwise.
    pub fn authorize(caller: &Caller, capability: Capability) -> Result<(), GaugeError> {
        if caller.has(capability) {
            Ok(())
        } else {
            Err(GaugeError::permission_denied(capability.as_str()))
        }
    }

    /// Whether `caller` may manage `target`'s account.
    ///
    /// Admins manage anyone who is not a system administrator; system
    /// administrators are managed only by other system administrators.
    pub fn can_manage_target(caller: &Caller, target: &Caller) -> bool {
        if target.is_system_admin() {
            caller.is_system_admin()
        } else {
            caller.role >= Role::Admin
        }
    }

    /// Rejects a self-change that would leave the system without any
    /// system administrator.
    ///
    /// `retains_system_admin` is whether the caller still holds
    /// `system.admin` after the change; `system_admin_count` is the current
    /// number of holders, supplied by the caller boundary.
    pub fn check_self_demotion(
        caller: &Caller,
        retains_system_admin: bool,
        system_admin_count: usize,
    ) -> Result<(), GaugeError> {
        if caller.is_system_admin() && !retains_system_admin && system_admin_count <= 1 {
            return Err(GaugeError::precondition_failed(
                "Cannot remove the last system administrator",
            ));
        }
        Ok(())
    }
}
