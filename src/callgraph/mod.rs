//! Call graph data model.
//!
//! This module defines:
//! - Operation identities (name + call variant, plus the ROOT/ALL sentinels)
//! - The deduplicating call tree built while a program runs

pub mod edge;
pub mod operation;

// Re-export main types
pub use edge::{CallEdge, CallTree};
pub use operation::{OperationKey, TracedOperation, Variant};
