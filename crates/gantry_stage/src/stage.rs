//! The stage interface.
//!
//! A stage is the prim hierarchy owned by a host runtime. Authoring
//! code in this workspace is written against this trait so it can
//! target any host; [`MemoryStage`](crate::memory::MemoryStage) is the
//! reference implementation used in tests and examples.

use thiserror::Error;

use crate::path::{PathError, PrimPath};
use crate::pattern::PatternError;
use crate::prim::{Prim, SemanticTag};
use crate::value::Value;

/// Hosts below this interface version ignore the `copy_from_source`
/// clone flag and always clone by reference.
pub const CLONE_COPY_FROM_SOURCE_VERSION: u32 = 2;

/// Errors reported by stage operations.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("no prim exists at '{0}'")]
    PrimNotFound(PrimPath),

    #[error("a prim already exists at '{0}'")]
    PrimExists(PrimPath),

    #[error("cannot edit '{path}': it is inside instance '{instance}'")]
    InstanceEdit { path: PrimPath, instance: PrimPath },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Result type for stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Options for subtree cloning.
#[derive(Clone, Copy, Debug)]
pub struct CloneOptions {
    /// Register the targets with the physics backend as replicas
    /// sharing the source's physics description. When off, each
    /// target's physics state is established independently.
    pub replicate_physics: bool,

    /// Copy prim data into each target instead of referencing the
    /// source. Ignored (treated as false) by hosts older than
    /// [`CLONE_COPY_FROM_SOURCE_VERSION`].
    pub copy_from_source: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            replicate_physics: false,
            copy_from_source: true,
        }
    }
}

/// Interface to a scene-graph host.
///
/// Prims are addressed by [`PrimPath`]; the path doubles as the prim
/// handle. Enumerations (`children`, `descendants`, `find_matching`)
/// are in lexicographic path order, which makes every walk and every
/// pattern resolution deterministic.
pub trait Stage {
    /// Whether a prim exists at `path`.
    fn has_prim(&self, path: &PrimPath) -> bool;

    /// The prim record at `path`, if any.
    fn prim(&self, path: &PrimPath) -> Option<&Prim>;

    /// Direct children of `path`, in order.
    ///
    /// Instance proxies expose no children.
    fn children(&self, path: &PrimPath) -> StageResult<Vec<PrimPath>>;

    /// `path` itself plus all its transitive children, in order.
    fn descendants(&self, path: &PrimPath) -> StageResult<Vec<PrimPath>>;

    /// Whether the prim at `path` is an instance proxy.
    fn is_instance(&self, path: &PrimPath) -> bool;

    /// All prim paths matching a pattern expression, in order.
    ///
    /// A literal expression matches at most itself. An empty result is
    /// not an error.
    fn find_matching(&self, expr: &str) -> StageResult<Vec<PrimPath>>;

    /// Create a prim of the given type.
    ///
    /// Missing ancestors are created as typeless placeholders. Fails
    /// if a prim already exists at `path`.
    fn define_prim(&mut self, path: &PrimPath, type_name: &str) -> StageResult<()>;

    /// Remove a prim and its entire subtree. Removing the root clears
    /// the stage.
    fn remove_prim(&mut self, path: &PrimPath) -> StageResult<()>;

    /// Author an attribute on a prim.
    fn set_attribute(&mut self, path: &PrimPath, name: &str, value: Value) -> StageResult<()>;

    /// Read back an authored attribute.
    fn attribute(&self, path: &PrimPath, name: &str) -> Option<&Value>;

    /// Apply an API schema to a prim.
    fn apply_api(&mut self, path: &PrimPath, api: &str) -> StageResult<()>;

    /// Whether a prim carries an API schema.
    fn has_api(&self, path: &PrimPath, api: &str) -> bool;

    /// Toggle instancing on a prim.
    ///
    /// Turning instancing off on an instance proxy materializes the
    /// referenced subtree in place, making it editable.
    fn set_instanceable(&mut self, path: &PrimPath, instanceable: bool) -> StageResult<()>;

    /// Attach a semantic tag under a (sanitized) label.
    fn apply_tag(&mut self, path: &PrimPath, label: &str, tag: SemanticTag) -> StageResult<()>;

    /// Clone the subtree at `source` to each of `targets`.
    ///
    /// Target prims must not already exist; their missing ancestors
    /// are created as placeholders.
    fn clone_subtree(
        &mut self,
        source: &PrimPath,
        targets: &[PrimPath],
        options: CloneOptions,
    ) -> StageResult<()>;

    /// Host interface version, gating newer clone behavior.
    fn host_version(&self) -> u32;
}
