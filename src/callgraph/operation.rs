//! Operation identities.
//!
//! An [`OperationKey`] names "this operation, called in this variant".
//! Two sentinel keys live outside the normal namespace: [`OperationKey::Root`]
//! is the synthetic top-level caller, [`OperationKey::All`] is the wildcard
//! used only when aggregating.

use crate::utils::config::{ALL_OPERATION_NAME, ROOT_OPERATION_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which form of an operation is being called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Body,
    Adjoint,
    Controlled,
    ControlledAdjoint,
}

impl Variant {
    /// All variants, in declaration order
    pub const ALL: [Variant; 4] = [
        Variant::Body,
        Variant::Adjoint,
        Variant::Controlled,
        Variant::ControlledAdjoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Body => "Body",
            Variant::Adjoint => "Adjoint",
            Variant::Controlled => "Controlled",
            Variant::ControlledAdjoint => "ControlledAdjoint",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    /// Case-insensitive; `Controlled Adjoint` and `controlled_adjoint` are accepted too
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "body" => Ok(Variant::Body),
            "adjoint" => Ok(Variant::Adjoint),
            "controlled" => Ok(Variant::Controlled),
            "controlledadjoint" => Ok(Variant::ControlledAdjoint),
            _ => Err(format!("unknown operation variant: {}", s)),
        }
    }
}

/// Anything that can tell the recorder which operation it is.
///
/// Name resolution is owned by whoever raises the start/end events; the
/// recorder only needs the already-resolved name and variant.
pub trait TracedOperation {
    fn full_name(&self) -> &str;

    fn variant(&self) -> Variant;
}

impl<S: AsRef<str>> TracedOperation for (S, Variant) {
    fn full_name(&self) -> &str {
        self.0.as_ref()
    }

    fn variant(&self) -> Variant {
        self.1
    }
}

/// Identity of an operation in one call variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKey {
    /// Synthetic caller of every top-level operation
    Root,
    /// Wildcard, only ever used as an aggregation key
    All,
    Operation { full_name: String, variant: Variant },
}

impl OperationKey {
    pub const ROOT: OperationKey = OperationKey::Root;
    pub const ALL: OperationKey = OperationKey::All;

    pub fn new(full_name: impl Into<String>, variant: Variant) -> Self {
        OperationKey::Operation {
            full_name: full_name.into(),
            variant,
        }
    }

    /// Resolve the key for an operation raising a trace event
    pub fn from_operation<O: TracedOperation + ?Sized>(op: &O) -> Self {
        OperationKey::new(op.full_name(), op.variant())
    }

    pub fn full_name(&self) -> &str {
        match self {
            OperationKey::Root => ROOT_OPERATION_NAME,
            OperationKey::All => ALL_OPERATION_NAME,
            OperationKey::Operation { full_name, .. } => full_name,
        }
    }

    /// Variant of a real operation; `None` for the sentinels
    pub fn variant(&self) -> Option<Variant> {
        match self {
            OperationKey::Operation { variant, .. } => Some(*variant),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, OperationKey::Root)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, OperationKey::All)
    }

    /// Whether a trace event for `op` refers to this key.
    ///
    /// Sentinels never match: no real event can open or close them.
    pub fn matches<O: TracedOperation + ?Sized>(&self, op: &O) -> bool {
        match self {
            OperationKey::Operation { full_name, variant } => {
                full_name == op.full_name() && *variant == op.variant()
            }
            _ => false,
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKey::Operation {
                full_name,
                variant: Variant::Body,
            } => write!(f, "{}", full_name),
            OperationKey::Operation { full_name, variant } => {
                write!(f, "{} ({})", full_name, variant)
            }
            sentinel => f.write_str(sentinel.full_name()),
        }
    }
}
