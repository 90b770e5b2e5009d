//! Aggregation keys.

use crate::callgraph::OperationKey;
use std::fmt;

/// A (callee, caller) pair used to roll statistics up independently of
/// where in the call tree the call happened. Either side may be the
/// wildcard [`OperationKey::All`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    pub callee: OperationKey,
    pub caller: OperationKey,
}

/// The whole traced program: the root, called by anyone
pub const ROOT_AGGREGATE: AggregateKey = AggregateKey {
    callee: OperationKey::Root,
    caller: OperationKey::All,
};

impl AggregateKey {
    pub fn new(callee: OperationKey, caller: OperationKey) -> Self {
        Self { callee, caller }
    }

    /// Callee-only key: this operation, any caller
    pub fn any_caller(callee: OperationKey) -> Self {
        Self::new(callee, OperationKey::All)
    }

    pub fn contains_wildcard(&self) -> bool {
        self.caller.is_all() || self.callee.is_all()
    }

    pub fn is_root_call(&self) -> bool {
        self.caller.is_root()
    }

    /// Values for the key columns of a CSV row: callee name and variant,
    /// then caller name and variant. Sentinels have an empty variant.
    pub fn column_values(&self) -> [String; 4] {
        let variant = |op: &OperationKey| op.variant().map(|v| v.to_string()).unwrap_or_default();
        [
            self.callee.full_name().to_string(),
            variant(&self.callee),
            self.caller.full_name().to_string(),
            variant(&self.caller),
        ]
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.callee, self.caller)
    }
}
