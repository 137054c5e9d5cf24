//! Permission constants and the capability-check seam.
//!
//! Access control is owned by the caller: before invoking a schedule
//! operation it asks a [`CapabilityCheck`] whether the current user may
//! perform `action` on `resource`. The schedule service itself assumes the
//! caller already gated access.
//!
//! # Example
//!
//! ```ignore
//! use timetable_core::permissions::{self, CapabilityCheck, StaticCapabilities};
//!
//! let caps = StaticCapabilities::from_permissions(["teacher_schedules:read"]);
//! assert!(caps.can_perform(permissions::TEACHER_SCHEDULES, permissions::READ));
//! ```

use std::collections::HashSet;

// =============================================================================
// Resources
// =============================================================================

/// Resource name for teacher timetable entries
pub const TEACHER_SCHEDULES: &str = "teacher_schedules";

// =============================================================================
// Actions
// =============================================================================

pub const READ: &str = "read";
pub const CREATE: &str = "create";
pub const UPDATE: &str = "update";
pub const DELETE: &str = "delete";
/// Bulk generation from the grid layout and flat import
pub const IMPORT: &str = "import";
pub const EXPORT: &str = "export";

/// Builds the `resource:action` permission string.
pub fn permission_name(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

/// Boolean capability predicate consumed by the calling layer.
pub trait CapabilityCheck: Send + Sync {
    fn can_perform(&self, resource: &str, action: &str) -> bool;
}

/// Capability check backed by a fixed set of `resource:action` strings.
///
/// A `resource:*` entry grants every action on that resource.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    granted: HashSet<String>,
}

impl StaticCapabilities {
    pub fn from_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Every action on the teacher schedule resource.
    pub fn schedule_admin() -> Self {
        Self::from_permissions([permission_name(TEACHER_SCHEDULES, "*")])
    }
}

impl CapabilityCheck for StaticCapabilities {
    fn can_perform(&self, resource: &str, action: &str) -> bool {
        self.granted.contains(&permission_name(resource, action))
            || self.granted.contains(&permission_name(resource, "*"))
    }
}
