//! Layer files.
//!
//! A layer is a JSON snapshot of a subtree: prim records keyed by
//! their path relative to the captured root. Layers move authored
//! content between stages: capture on one stage, instantiate on
//! another (or elsewhere on the same stage).
//!
//! Instance references are not carried across: a proxy captured into a
//! layer instantiates as a plain prim, since its source path has no
//! meaning on the destination stage.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{PathError, PrimPath};
use crate::prim::Prim;
use crate::stage::{Stage, StageError};

/// Errors that can occur reading or writing layers.
#[derive(Error, Debug)]
pub enum LayerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("layer '{0}' contains no prims")]
    Empty(String),
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// One prim entry in a layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerPrim {
    /// Path relative to the captured root; empty for the root itself.
    pub path: String,

    /// Full prim record.
    pub prim: Prim,
}

/// A serialized subtree snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    /// Name of the prim the layer was captured from.
    pub default_prim: String,

    /// Prim entries in lexicographic order, root first.
    pub prims: Vec<LayerPrim>,
}

impl Layer {
    /// Capture the subtree rooted at `root` from a stage.
    pub fn capture<S: Stage>(stage: &S, root: &PrimPath) -> LayerResult<Self> {
        let mut prims = Vec::new();
        for path in stage.descendants(root)? {
            if let Some(prim) = stage.prim(&path) {
                let rel = path
                    .as_str()
                    .strip_prefix(root.as_str())
                    .unwrap_or("")
                    .trim_start_matches('/');
                prims.push(LayerPrim {
                    path: rel.to_string(),
                    prim: prim.clone(),
                });
            }
        }
        Ok(Self {
            default_prim: root.name().to_string(),
            prims,
        })
    }

    /// Instantiate the layer at `path` on a stage.
    ///
    /// The target prim must not already exist. Attributes, API schemas
    /// and tags are authored through the stage interface, so the same
    /// ancestor and instance-edit rules apply as for `define_prim`.
    pub fn instantiate<S: Stage>(&self, stage: &mut S, path: &PrimPath) -> LayerResult<()> {
        if self.prims.is_empty() {
            return Err(LayerError::Empty(self.default_prim.clone()));
        }

        for entry in &self.prims {
            let target = join(path, &entry.path)?;
            stage.define_prim(&target, &entry.prim.type_name)?;
            for (name, value) in &entry.prim.attributes {
                stage.set_attribute(&target, name, value.clone())?;
            }
            for api in &entry.prim.api_schemas {
                stage.apply_api(&target, api)?;
            }
            for (label, tag) in &entry.prim.tags {
                stage.apply_tag(&target, label, tag.clone())?;
            }
            if entry.prim.instanceable && entry.prim.instance_of.is_none() {
                stage.set_instanceable(&target, true)?;
            }
        }
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> LayerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a layer from JSON.
    pub fn from_json(json: &str) -> LayerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the layer to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LayerResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a layer from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> LayerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Capture a subtree and write it straight to a file.
pub fn export_subtree<S: Stage, P: AsRef<Path>>(
    stage: &S,
    root: &PrimPath,
    path: P,
) -> LayerResult<()> {
    Layer::capture(stage, root)?.save(path)
}

/// Append a relative layer path to an absolute root.
fn join(root: &PrimPath, rel: &str) -> Result<PrimPath, PathError> {
    if rel.is_empty() {
        return Ok(root.clone());
    }
    let mut path = root.clone();
    for segment in rel.split('/') {
        path = path.child(segment)?;
    }
    Ok(path)
}
