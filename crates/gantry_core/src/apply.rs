//! Subtree application.
//!
//! [`apply_to_subtree`] drives a per-prim operation over a hierarchy:
//! breadth-first from a root, skipping instance proxies, and pruning a
//! branch as soon as the operation succeeds on it. The pruning is what
//! keeps schema-like state from being applied at two nesting levels of
//! the same branch.

use std::collections::VecDeque;

use gantry_stage::{PrimPath, Stage, StageError};

/// Outcome of a subtree application.
#[derive(Clone, Debug, Default)]
pub struct ApplyReport {
    /// Number of prims the operation succeeded on.
    pub applied: usize,

    /// Instance proxies encountered and skipped, in visit order.
    pub skipped_instances: Vec<PrimPath>,
}

impl ApplyReport {
    /// Whether the operation succeeded on at least one prim.
    pub fn any_applied(&self) -> bool {
        self.applied > 0
    }
}

/// Apply `op` over the subtree rooted at `root`.
///
/// The walk is breadth-first. Instance proxies are recorded in the
/// report and neither visited nor descended into. When `op` returns
/// `Ok(true)` the prim counts as applied and its descendants are
/// pruned; `Ok(false)` means the prim did not take the operation and
/// its children are walked instead. An error from `op` aborts the walk
/// and propagates; prims already modified stay modified.
///
/// Succeeding on no prim at all is not an error: a warning naming
/// `label` is logged and the empty report is returned.
pub fn apply_to_subtree<S, F>(
    stage: &mut S,
    root: &PrimPath,
    label: &str,
    mut op: F,
) -> Result<ApplyReport, StageError>
where
    S: Stage,
    F: FnMut(&mut S, &PrimPath) -> Result<bool, StageError>,
{
    if !stage.has_prim(root) {
        return Err(StageError::PrimNotFound(root.clone()));
    }

    let mut report = ApplyReport::default();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(path) = queue.pop_front() {
        if stage.is_instance(&path) {
            report.skipped_instances.push(path);
            continue;
        }
        if op(stage, &path)? {
            report.applied += 1;
            continue;
        }
        queue.extend(stage.children(&path)?);
    }

    if !report.any_applied() {
        let skipped: Vec<&str> = report.skipped_instances.iter().map(|p| p.as_str()).collect();
        log::warn!(
            "'{}' applied to no prim under '{}' (skipped instance proxies: {:?})",
            label,
            root,
            skipped
        );
    }

    Ok(report)
}

/// Turn off instancing on every prim in a subtree.
///
/// Unlike [`apply_to_subtree`] this walks the whole hierarchy with no
/// pruning: each proxy found is materialized in place and the walk
/// continues into its now-editable children. Returns the number of
/// prims that had instancing disabled.
pub fn disable_instancing<S: Stage>(stage: &mut S, root: &PrimPath) -> Result<usize, StageError> {
    if !stage.has_prim(root) {
        return Err(StageError::PrimNotFound(root.clone()));
    }

    let mut changed = 0;
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(path) = queue.pop_front() {
        if stage.is_instance(&path) {
            stage.set_instanceable(&path, false)?;
            changed += 1;
        }
        queue.extend(stage.children(&path)?);
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_stage::{CloneOptions, MemoryStage, Value};

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    fn stage_with(prims: &[(&str, &str)]) -> MemoryStage {
        let mut stage = MemoryStage::new();
        for (p, type_name) in prims {
            stage.define_prim(&path(p), type_name).unwrap();
        }
        stage
    }

    /// Stage with an instance proxy at /World/proxy referencing
    /// /World/Template.
    fn stage_with_proxy() -> MemoryStage {
        let mut stage = stage_with(&[
            ("/World/Template", "Xform"),
            ("/World/Template/mesh", "Cube"),
            ("/World/plain", "Xform"),
        ]);
        stage
            .clone_subtree(
                &path("/World/Template"),
                &[path("/World/proxy")],
                CloneOptions {
                    replicate_physics: false,
                    copy_from_source: false,
                },
            )
            .unwrap();
        stage
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let mut stage = MemoryStage::new();
        let err = apply_to_subtree(&mut stage, &path("/Nowhere"), "noop", |_, _| Ok(false))
            .unwrap_err();
        assert!(matches!(err, StageError::PrimNotFound(_)));
    }

    #[test]
    fn test_success_at_root_visits_nothing_else() {
        let mut stage = stage_with(&[("/World", "Xform"), ("/World/a", "Cube"), ("/World/b", "Cube")]);

        let mut visited = Vec::new();
        let report = apply_to_subtree(&mut stage, &path("/World"), "mark", |_, p| {
            visited.push(p.as_str().to_string());
            Ok(true)
        })
        .unwrap();

        assert_eq!(report.applied, 1);
        assert!(report.any_applied());
        assert_eq!(visited, vec!["/World"]);
    }

    #[test]
    fn test_success_prunes_descendants() {
        let mut stage = stage_with(&[
            ("/World", "Xform"),
            ("/World/a", "Xform"),
            ("/World/a/deep", "Cube"),
            ("/World/b", "Cube"),
        ]);

        let mut visited = Vec::new();
        let report = apply_to_subtree(&mut stage, &path("/World"), "mark", |_, p| {
            visited.push(p.as_str().to_string());
            Ok(p.as_str() == "/World/a")
        })
        .unwrap();

        assert_eq!(report.applied, 1);
        // /World/a succeeded, so /World/a/deep was never offered
        assert_eq!(visited, vec!["/World", "/World/a", "/World/b"]);
    }

    #[test]
    fn test_no_success_visits_everything_once() {
        let mut stage = stage_with(&[
            ("/World", "Xform"),
            ("/World/a", "Xform"),
            ("/World/a/deep", "Cube"),
            ("/World/b", "Cube"),
        ]);

        let mut visited = Vec::new();
        let report = apply_to_subtree(&mut stage, &path("/World"), "mark", |_, p| {
            visited.push(p.as_str().to_string());
            Ok(false)
        })
        .unwrap();

        assert_eq!(report.applied, 0);
        visited.sort();
        assert_eq!(visited, vec!["/World", "/World/a", "/World/a/deep", "/World/b"]);
    }

    #[test]
    fn test_instances_are_skipped_not_visited() {
        let mut stage = stage_with_proxy();

        let mut visited = Vec::new();
        let report = apply_to_subtree(&mut stage, &path("/World"), "mark", |_, p| {
            visited.push(p.as_str().to_string());
            Ok(false)
        })
        .unwrap();

        assert!(!visited.contains(&"/World/proxy".to_string()));
        assert_eq!(report.skipped_instances, vec![path("/World/proxy")]);
    }

    #[test]
    fn test_zero_success_report_names_skipped_proxies() {
        let mut stage = stage_with_proxy();
        stage
            .clone_subtree(
                &path("/World/Template"),
                &[path("/World/proxy2")],
                CloneOptions {
                    replicate_physics: false,
                    copy_from_source: false,
                },
            )
            .unwrap();

        let report =
            apply_to_subtree(&mut stage, &path("/World"), "mark", |_, _| Ok(false)).unwrap();

        // the no-effect warning is fed from exactly this state: zero
        // applications and the proxies passed over, in visit order
        assert!(!report.any_applied());
        assert_eq!(report.applied, 0);
        assert_eq!(
            report.skipped_instances,
            vec![path("/World/proxy"), path("/World/proxy2")]
        );
    }

    #[test]
    fn test_root_proxy_yields_one_skip() {
        let mut stage = stage_with_proxy();

        let report = apply_to_subtree(&mut stage, &path("/World/proxy"), "mark", |_, _| Ok(true))
            .unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped_instances, vec![path("/World/proxy")]);
    }

    #[test]
    fn test_op_can_mutate_the_stage() {
        let mut stage = stage_with(&[("/World", "Xform"), ("/World/a", "Cube")]);

        apply_to_subtree(&mut stage, &path("/World"), "tag_cubes", |stage, p| {
            if stage.prim(p).map(|prim| prim.type_name == "Cube").unwrap_or(false) {
                stage.set_attribute(p, "marked", Value::Bool(true))?;
                return Ok(true);
            }
            Ok(false)
        })
        .unwrap();

        assert_eq!(stage.attribute(&path("/World/a"), "marked"), Some(&Value::Bool(true)));
        assert_eq!(stage.attribute(&path("/World"), "marked"), None);
    }

    #[test]
    fn test_op_error_aborts_walk() {
        let mut stage = stage_with(&[("/World", "Xform"), ("/World/a", "Cube")]);

        let err = apply_to_subtree(&mut stage, &path("/World"), "broken", |_, p| {
            if p.as_str() == "/World/a" {
                return Err(StageError::PrimNotFound(p.clone()));
            }
            Ok(false)
        })
        .unwrap_err();

        assert!(matches!(err, StageError::PrimNotFound(_)));
    }

    #[test]
    fn test_disable_instancing_materializes_and_descends() {
        let mut stage = stage_with_proxy();

        let changed = disable_instancing(&mut stage, &path("/World")).unwrap();

        assert_eq!(changed, 1);
        assert!(!stage.is_instance(&path("/World/proxy")));
        // the referenced subtree is now real and traversable
        assert!(stage.has_prim(&path("/World/proxy/mesh")));
    }
}
