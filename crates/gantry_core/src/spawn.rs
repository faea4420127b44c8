//! Spawning with clone fan-out.
//!
//! A template path like `/World/Table_[0-9]+/Bottle` names one leaf
//! prim under every parent matching a pattern. Spawning builds the
//! prim once, at the first match in resolution order, then clones the
//! result to the remaining matches, so expensive construction happens
//! a single time per template.

use gantry_stage::{
    is_identifier, is_literal_path, CloneOptions, PrimPath, SemanticTag, Stage, StageError,
    Value, CLONE_COPY_FROM_SOURCE_VERSION,
};
use thiserror::Error;

/// Attribute carrying render visibility.
pub const VISIBILITY_ATTR: &str = "visibility";

/// Visibility token for shown prims.
pub const TOKEN_INHERITED: &str = "inherited";

/// Visibility token for hidden prims.
pub const TOKEN_INVISIBLE: &str = "invisible";

/// Contact-report force threshold authored by spawn configs.
const CONTACT_THRESHOLD: f32 = 1.0;

/// Errors from spawn operations.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("pattern '{0}' matched no prims; create the parent prims before spawning")]
    UnresolvedPattern(String),

    #[error("invalid spawn configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Layer(#[from] gantry_stage::LayerError),
}

/// Result type for spawn operations.
pub type SpawnResult<T> = Result<T, SpawnError>;

/// Which prims get contact reporting after a spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SensorSelector {
    /// The spawned prim itself.
    SpawnedPrim,

    /// Every prim matching a pattern relative to the spawned prim.
    /// A pattern that matches nothing activates nothing.
    Matching(String),
}

/// Configuration shared by all spawners.
#[derive(Clone, Debug)]
pub struct SpawnCfg {
    /// Initial visibility, if any should be authored.
    pub visible: Option<bool>,

    /// Semantic tags to attach to the spawned prim.
    pub semantic_tags: Vec<SemanticTag>,

    /// Contact-reporting selection, if sensors should be activated.
    pub activate_contact_sensors: Option<SensorSelector>,

    /// Clone by copying prim data rather than referencing the source.
    /// Hosts older than [`CLONE_COPY_FROM_SOURCE_VERSION`] ignore this
    /// and always clone by reference.
    pub copy_from_source: bool,
}

impl Default for SpawnCfg {
    fn default() -> Self {
        Self {
            visible: None,
            semantic_tags: Vec::new(),
            activate_contact_sensors: None,
            copy_from_source: true,
        }
    }
}

/// Sanitized label under which a tag is filed: `{category}_{value}`
/// with spaces turned into underscores. The tag itself stays as given.
pub fn tag_label(tag: &SemanticTag) -> String {
    format!("{}_{}", tag.category, tag.value).replace(' ', "_")
}

/// Spawn a prim from a template path and clone it to every other
/// parent the template matches.
///
/// The template is split at its last `/` into a parent expression and
/// a leaf name. A parent containing characters outside the literal
/// alphabet is resolved as a pattern against the stage; a literal (or
/// empty) parent is the single candidate as given. `spawn_fn` runs
/// exactly once, at the first candidate, and returns the path of the
/// prim it built there. The post-spawn settings in `cfg` are applied
/// to that prim, and the finished subtree is then cloned to the
/// remaining candidates with physics replication off.
///
/// Returns the path of the spawned prim, never one of the clones.
pub fn spawn_and_clone<S, F>(
    stage: &mut S,
    template: &str,
    cfg: &SpawnCfg,
    spawn_fn: F,
) -> SpawnResult<PrimPath>
where
    S: Stage,
    F: FnOnce(&mut S, &PrimPath) -> SpawnResult<PrimPath>,
{
    let (first, rest) = resolve_candidates(stage, template)?;

    let spawned = spawn_fn(stage, &first)?;
    configure_spawned(stage, &spawned, cfg)?;

    if !rest.is_empty() {
        let copy_from_source =
            cfg.copy_from_source && stage.host_version() >= CLONE_COPY_FROM_SOURCE_VERSION;
        if cfg.copy_from_source && !copy_from_source {
            log::debug!(
                "host version {} predates copy-on-clone; cloning '{}' by reference",
                stage.host_version(),
                spawned
            );
        }
        stage.clone_subtree(
            &spawned,
            &rest,
            CloneOptions {
                replicate_physics: false,
                copy_from_source,
            },
        )?;
        log::info!(
            "spawned '{}' and cloned it to {} sibling path(s)",
            spawned,
            rest.len()
        );
    }

    Ok(spawned)
}

/// Expand a template into the first candidate path plus the clone
/// targets, in resolution order.
fn resolve_candidates<S: Stage>(
    stage: &S,
    template: &str,
) -> SpawnResult<(PrimPath, Vec<PrimPath>)> {
    let (parent_expr, leaf) = match template.rsplit_once('/') {
        Some(parts) => parts,
        None => {
            return Err(SpawnError::Config(format!(
                "template '{}' must be an absolute path",
                template
            )))
        }
    };
    if !is_identifier(leaf) {
        return Err(SpawnError::Config(format!(
            "template leaf '{}' is not a valid prim name",
            leaf
        )));
    }

    let is_pattern = !parent_expr.is_empty() && !is_literal_path(parent_expr);

    let mut paths = Vec::new();
    if is_pattern {
        for parent in stage.find_matching(parent_expr)? {
            paths.push(parent.child(leaf).map_err(StageError::from)?);
        }
        if paths.is_empty() {
            return Err(SpawnError::UnresolvedPattern(parent_expr.to_string()));
        }
    } else {
        let parent = if parent_expr.is_empty() {
            PrimPath::root()
        } else {
            PrimPath::new(parent_expr).map_err(StageError::from)?
        };
        paths.push(parent.child(leaf).map_err(StageError::from)?);
    }

    let mut iter = paths.into_iter();
    match iter.next() {
        Some(first) => Ok((first, iter.collect())),
        None => Err(SpawnError::UnresolvedPattern(template.to_string())),
    }
}

/// Apply the shared spawn settings to a freshly built prim.
fn configure_spawned<S: Stage>(stage: &mut S, path: &PrimPath, cfg: &SpawnCfg) -> SpawnResult<()> {
    if let Some(visible) = cfg.visible {
        let token = if visible { TOKEN_INHERITED } else { TOKEN_INVISIBLE };
        stage.set_attribute(path, VISIBILITY_ATTR, Value::token(token))?;
    }

    for tag in &cfg.semantic_tags {
        stage.apply_tag(path, &tag_label(tag), tag.clone())?;
    }

    if let Some(selector) = &cfg.activate_contact_sensors {
        let roots = match selector {
            SensorSelector::SpawnedPrim => vec![path.clone()],
            SensorSelector::Matching(sub) => {
                let expr = format!("{}/{}", path, sub);
                let matches = stage.find_matching(&expr)?;
                if matches.is_empty() {
                    log::warn!("sensor pattern '{}' matched no prims; none activated", expr);
                }
                matches
            }
        };
        for root in &roots {
            crate::schemas::activate_contact_sensors(stage, root, CONTACT_THRESHOLD)?;
        }
    }

    Ok(())
}
