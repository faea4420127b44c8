//! Gantry Stage - scene-graph object model and host interface.
//!
//! This crate provides:
//!
//! - **Core types**: `PrimPath`, `Value`, `Prim`, `SemanticTag`
//! - **Patterns**: wildcard path expressions for resolving prims
//! - **Host interface**: the `Stage` trait and clone options
//! - **Reference host**: `MemoryStage`, an in-memory implementation
//! - **Layers**: JSON subtree snapshots for export and re-spawning
//!
//! # Example
//!
//! ```ignore
//! use gantry_stage::{MemoryStage, PrimPath, Stage, Value};
//!
//! let mut stage = MemoryStage::new();
//! let robot = PrimPath::new("/World/Robot")?;
//! stage.define_prim(&robot, "Xform")?;
//! stage.set_attribute(&robot, "visibility", Value::token("inherited"))?;
//! ```

pub mod layer;
pub mod memory;
pub mod path;
pub mod pattern;
pub mod prim;
pub mod stage;
pub mod value;

// Re-export commonly used items
pub use layer::{export_subtree, Layer, LayerError, LayerPrim, LayerResult};
pub use memory::{MemoryStage, ReplicationGroup};
pub use path::{is_identifier, PathError, PathResult, PrimPath};
pub use pattern::{is_literal_path, PathPattern, PatternError};
pub use prim::{Prim, SemanticTag};
pub use stage::{
    CloneOptions, Stage, StageError, StageResult, CLONE_COPY_FROM_SOURCE_VERSION,
};
pub use value::Value;
