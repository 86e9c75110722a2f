use super::violation_kind::ViolationKind;
use serde::Serialize;
use std::collections::HashMap;

/// Grace period applied when a policy does not set one.
pub const DEFAULT_TOLERANCE_MINUTES: i64 = 0;

#[derive(Debug, Clone, Serialize)]
pub struct FinePolicy {
    pub id: i64,
    pub neighborhood_id: i64,
    pub violation_kind: ViolationKind,
    pub amount: i64,
    pub tolerance_minutes: Option<i64>,
    pub is_active: bool,
}

impl FinePolicy {
    pub fn tolerance(&self) -> i64 {
        self.tolerance_minutes.unwrap_or(DEFAULT_TOLERANCE_MINUTES)
    }
}

/// Active policies of one neighborhood, keyed by violation kind.
/// Built once per evaluation call.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    by_kind: HashMap<ViolationKind, FinePolicy>,
}

impl PolicySet {
    /// Inactive policies are ignored.
    pub fn from_policies<I: IntoIterator<Item = FinePolicy>>(policies: I) -> Self {
        let by_kind = policies
            .into_iter()
            .filter(|p| p.is_active)
            .map(|p| (p.violation_kind, p))
            .collect();
        Self { by_kind }
    }

    pub fn get(&self, kind: ViolationKind) -> Option<&FinePolicy> {
        self.by_kind.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
