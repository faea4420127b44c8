//! Scene authoring operations on top of `gantry_stage`.
//!
//! Features:
//! - Pruned breadth-first subtree application for schema edits
//! - Pattern-based spawning with clone fan-out across environments
//! - Physics API schemas (rigid body, collision, mass, articulation)
//! - Visual and physics material authoring and binding
//! - Shape and layer-file spawners
//!
//! ```ignore
//! use gantry_core::shapes::{spawn_cuboid, CuboidCfg};
//! use gantry_stage::MemoryStage;
//!
//! let mut stage = MemoryStage::new();
//! // ... define /World/Table_0 .. /World/Table_3 ...
//! let cfg = CuboidCfg::default();
//! let first = spawn_cuboid(&mut stage, "/World/Table_[0-9]+/Crate", &cfg)?;
//! ```

pub mod apply;
pub mod assets;
pub mod materials;
pub mod schemas;
pub mod shapes;
pub mod spawn;

pub use apply::{apply_to_subtree, disable_instancing, ApplyReport};
pub use assets::{spawn_from_layer, LayerFileCfg};
pub use spawn::{spawn_and_clone, SensorSelector, SpawnCfg, SpawnError, SpawnResult};
