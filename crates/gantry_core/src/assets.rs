//! Spawning from layer files.
//!
//! A layer file is a JSON subtree snapshot captured with
//! [`gantry_stage::export_subtree`]. Spawning one instantiates its
//! prims at a template path, with the same fan-out as every other
//! spawner.

use std::path::PathBuf;

use gantry_stage::{Layer, PrimPath, Stage};

use crate::spawn::{spawn_and_clone, SpawnCfg, SpawnResult};

/// Configuration for spawning a layer file.
#[derive(Clone, Debug, Default)]
pub struct LayerFileCfg {
    /// Shared spawn settings
    pub spawn: SpawnCfg,

    /// Layer file to instantiate
    pub layer_path: PathBuf,
}

/// Spawn the contents of a layer file at a template path, fanning out
/// to every match.
///
/// The file is read before any resolution happens, so a missing or
/// malformed file fails without touching the stage.
pub fn spawn_from_layer<S: Stage>(
    stage: &mut S,
    template: &str,
    cfg: &LayerFileCfg,
) -> SpawnResult<PrimPath> {
    let layer = Layer::load(&cfg.layer_path)?;
    spawn_and_clone(stage, template, &cfg.spawn, |stage, path| {
        layer.instantiate(stage, path)?;
        Ok(path.clone())
    })
}
