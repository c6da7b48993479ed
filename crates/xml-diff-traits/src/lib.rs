//! Core trait abstractions for XML comparison.
//!
//! This crate defines the node-access traits a diff engine walks, the
//! closed set of structural differences it can report, and the listener
//! hook through which each difference is judged.

pub mod difference;
pub mod error;
pub mod tree;

pub use difference::{Difference, DifferenceKind, DifferenceListener, NodeDetail, RejectAll, Verdict};
pub use error::{Error, Result};
pub use tree::{MutableXmlTree, NodeType, XmlTree};
