//! A small XML diff engine
//!
//! Documents are parsed with quick-xml into an arena DOM that keeps
//! comments, CDATA sections and attribute order, then walked side by side.
//! Every difference found is handed to a [`DifferenceListener`] which
//! decides whether it breaks identity, similarity, or neither.
//!
//! How the trees are viewed is controlled by process-wide flags in
//! [`config`], read lazily when a [`Diff`] is first evaluated.

pub mod config;
pub mod diff;
pub mod parser;
pub mod tree;
pub mod walker;
pub mod writer;

pub use config::{ConfigStore, EngineConfig, EngineFlag, GlobalConfig};
pub use diff::{Diff, InputSource};
pub use tree::{Document, NodeId, QName};

// Re-export the shared vocabulary for convenience
pub use xml_diff_traits::{
    Difference, DifferenceKind, DifferenceListener, Error, MutableXmlTree, NodeDetail, NodeType,
    RejectAll, Result, Verdict, XmlTree,
};
