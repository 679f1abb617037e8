//! Organization lifecycle: active, disabled and soft-deleted rows.
//!
//! The state of a row is derived entirely from two timestamps:
//!
//! | state    | `deleted_at` | `disabled_at` |
//! |----------|--------------|---------------|
//! | Active   | unset        | unset         |
//! | Disabled | unset        | set           |
//! | Deleted  | set          | any           |
//!
//! Every [`Transition`] carries a guard ([`Transition::guard`]) that the
//! store places in the WHERE clause of its update. A row outside the guard
//! is left untouched and the statement still succeeds, so repeating a
//! transition is an idempotent no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Active,
    Disabled,
    Deleted,
}

/// Read filter applied by every store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowFilter {
    /// Not soft-deleted, disabled rows included.
    #[default]
    Existing,
    /// Neither soft-deleted nor disabled.
    Active,
}

impl RowFilter {
    pub fn for_active_only(active_only: bool) -> Self {
        if active_only {
            RowFilter::Active
        } else {
            RowFilter::Existing
        }
    }

    pub fn admits(self, state: LifecycleState) -> bool {
        match self {
            RowFilter::Existing => state != LifecycleState::Deleted,
            RowFilter::Active => state == LifecycleState::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Active -> Disabled.
    Disable,
    /// Disabled -> Active. Deleted rows are not touched.
    Enable,
    /// Active | Disabled -> Deleted.
    SoftDelete,
    /// Deleted -> whatever `disabled_at` encodes. Unconditional.
    Restore,
}

impl Transition {
    /// Rows this transition may touch; `None` means any row with the id.
    pub fn guard(self) -> Option<RowFilter> {
        match self {
            Transition::Disable => Some(RowFilter::Active),
            Transition::Enable | Transition::SoftDelete => Some(RowFilter::Existing),
            Transition::Restore => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transition::Disable => "disable",
            Transition::Enable => "enable",
            Transition::SoftDelete => "soft_delete",
            Transition::Restore => "restore",
        }
    }
}

/// The two lifecycle timestamps of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    pub disabled_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        match (self.deleted_at, self.disabled_at) {
            (Some(_), _) => LifecycleState::Deleted,
            (None, Some(_)) => LifecycleState::Disabled,
            (None, None) => LifecycleState::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn state_follows_timestamps() {
        let active = Lifecycle::default();
        assert_eq!(active.state(), LifecycleState::Active);

        let disabled = Lifecycle {
            disabled_at: Some(at(1)),
            deleted_at: None,
        };
        assert_eq!(disabled.state(), LifecycleState::Disabled);

        let deleted = Lifecycle {
            disabled_at: Some(at(1)),
            deleted_at: Some(at(2)),
        };
        assert_eq!(deleted.state(), LifecycleState::Deleted);
    }

    #[test]
    fn filters_admit_expected_states() {
        assert!(RowFilter::Existing.admits(LifecycleState::Active));
        assert!(RowFilter::Existing.admits(LifecycleState::Disabled));
        assert!(!RowFilter::Existing.admits(LifecycleState::Deleted));

        assert!(RowFilter::Active.admits(LifecycleState::Active));
        assert!(!RowFilter::Active.admits(LifecycleState::Disabled));
        assert!(!RowFilter::Active.admits(LifecycleState::Deleted));

        assert_eq!(RowFilter::for_active_only(true), RowFilter::Active);
        assert_eq!(RowFilter::for_active_only(false), RowFilter::Existing);
    }

    #[test]
    fn guards_select_source_states() {
        assert_eq!(Transition::Disable.guard(), Some(RowFilter::Active));
        assert_eq!(Transition::Enable.guard(), Some(RowFilter::Existing));
        assert_eq!(Transition::SoftDelete.guard(), Some(RowFilter::Existing));
        assert!(Transition::Restore.guard().is_none());
    }
}
