//! In-memory reference stage.
//!
//! Prims are stored flat in a `BTreeMap` keyed by path, so every
//! enumeration comes back in lexicographic order and child listing is
//! a bounded range scan. The map never contains the pseudo-root; that
//! record is held separately.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::path::PrimPath;
use crate::pattern::{is_literal_path, PathPattern};
use crate::prim::{Prim, SemanticTag};
use crate::stage::{
    CloneOptions, Stage, StageError, StageResult, CLONE_COPY_FROM_SOURCE_VERSION,
};
use crate::value::Value;

/// A (source, targets) group registered for physics replication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationGroup {
    /// Subtree the replicas were cloned from
    pub source: PrimPath,

    /// Replica roots sharing the source's physics description
    pub targets: Vec<PrimPath>,
}

/// Reference in-memory implementation of [`Stage`].
#[derive(Debug)]
pub struct MemoryStage {
    root: Prim,
    prims: BTreeMap<PrimPath, Prim>,
    replications: Vec<ReplicationGroup>,
    version: u32,
}

impl MemoryStage {
    /// Create an empty stage at the current host interface version.
    pub fn new() -> Self {
        Self {
            root: Prim::default(),
            prims: BTreeMap::new(),
            replications: Vec::new(),
            version: CLONE_COPY_FROM_SOURCE_VERSION,
        }
    }

    /// Create an empty stage reporting a specific host version.
    pub fn with_host_version(version: u32) -> Self {
        Self {
            version,
            ..Self::new()
        }
    }

    /// Physics replication groups registered by cloning.
    pub fn physics_replications(&self) -> &[ReplicationGroup] {
        &self.replications
    }

    /// Number of prims on the stage, excluding the pseudo-root.
    pub fn prim_count(&self) -> usize {
        self.prims.len()
    }

    fn prim_mut(&mut self, path: &PrimPath) -> Option<&mut Prim> {
        if path.is_root() {
            Some(&mut self.root)
        } else {
            self.prims.get_mut(path)
        }
    }

    fn ensure_exists(&self, path: &PrimPath) -> StageResult<()> {
        if self.has_prim(path) {
            Ok(())
        } else {
            Err(StageError::PrimNotFound(path.clone()))
        }
    }

    /// Nearest strict ancestor of `path` that is an instance proxy.
    fn instance_ancestor(&self, path: &PrimPath) -> Option<PrimPath> {
        let mut current = path.parent();
        while let Some(p) = current {
            if self.is_instance(&p) {
                return Some(p);
            }
            current = p.parent();
        }
        None
    }

    /// Fails when `path` sits underneath an instance proxy. Edits on
    /// the proxy prim itself are allowed.
    fn ensure_editable(&self, path: &PrimPath) -> StageResult<()> {
        match self.instance_ancestor(path) {
            Some(instance) => Err(StageError::InstanceEdit {
                path: path.clone(),
                instance,
            }),
            None => Ok(()),
        }
    }

    /// Insert typeless placeholders for any missing ancestors.
    fn create_ancestors(&mut self, path: &PrimPath) {
        let mut missing = Vec::new();
        let mut current = path.parent();
        while let Some(p) = current {
            if p.is_root() || self.has_prim(&p) {
                break;
            }
            current = p.parent();
            missing.push(p);
        }
        for ancestor in missing.into_iter().rev() {
            self.prims.insert(ancestor, Prim::default());
        }
    }

    /// Deep-copy the subtree at `source` to `target`, remapping paths.
    fn copy_subtree(&mut self, source: &PrimPath, target: &PrimPath) -> StageResult<()> {
        let keys = self.descendants(source)?;
        for key in keys {
            let record = match self.prim(&key) {
                Some(p) => p.clone(),
                None => continue,
            };
            let rel = key.as_str().strip_prefix(source.as_str()).unwrap_or("");
            if rel.is_empty() {
                self.prims.insert(target.clone(), record);
            } else {
                let path = PrimPath::new(&format!("{}{}", target.as_str(), rel))?;
                self.prims.insert(path, record);
            }
        }
        Ok(())
    }

    /// Materialize an instance proxy: copy the referenced subtree's
    /// children under `target` and fold the source's authored data in
    /// beneath any local opinions.
    fn materialize(&mut self, source: &PrimPath, target: &PrimPath) -> StageResult<()> {
        let keys = self.descendants(source)?;
        for key in keys {
            let record = match self.prim(&key) {
                Some(p) => p.clone(),
                None => continue,
            };
            let rel = key.as_str().strip_prefix(source.as_str()).unwrap_or("");
            if rel.is_empty() {
                if let Some(prim) = self.prims.get_mut(target) {
                    if prim.type_name.is_empty() {
                        prim.type_name = record.type_name;
                    }
                    for (name, value) in record.attributes {
                        prim.attributes.entry(name).or_insert(value);
                    }
                    prim.api_schemas.extend(record.api_schemas);
                    for (label, tag) in record.tags {
                        prim.tags.entry(label).or_insert(tag);
                    }
                }
            } else {
                let path = PrimPath::new(&format!("{}{}", target.as_str(), rel))?;
                self.prims.insert(path, record);
            }
        }
        log::debug!("materialized instance '{}' from '{}'", target, source);
        Ok(())
    }
}

impl Default for MemoryStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Key prefix shared by all strict descendants of `path`.
fn child_prefix(path: &PrimPath) -> String {
    if path.is_root() {
        "/".to_string()
    } else {
        format!("{}/", path.as_str())
    }
}

impl Stage for MemoryStage {
    fn has_prim(&self, path: &PrimPath) -> bool {
        path.is_root() || self.prims.contains_key(path)
    }

    fn prim(&self, path: &PrimPath) -> Option<&Prim> {
        if path.is_root() {
            Some(&self.root)
        } else {
            self.prims.get(path)
        }
    }

    fn children(&self, path: &PrimPath) -> StageResult<Vec<PrimPath>> {
        self.ensure_exists(path)?;

        let prefix = child_prefix(path);
        let mut out = Vec::new();
        let range = self
            .prims
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded));
        for (key, _) in range {
            let rest = match key.as_str().strip_prefix(&prefix) {
                Some(rest) => rest,
                None => break,
            };
            if !rest.contains('/') {
                out.push(key.clone());
            }
        }
        Ok(out)
    }

    fn descendants(&self, path: &PrimPath) -> StageResult<Vec<PrimPath>> {
        self.ensure_exists(path)?;

        let prefix = child_prefix(path);
        let mut out = vec![path.clone()];
        let range = self
            .prims
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded));
        for (key, _) in range {
            if !key.as_str().starts_with(&prefix) {
                break;
            }
            out.push(key.clone());
        }
        Ok(out)
    }

    fn is_instance(&self, path: &PrimPath) -> bool {
        self.prim(path).map(|p| p.is_instance()).unwrap_or(false)
    }

    fn find_matching(&self, expr: &str) -> StageResult<Vec<PrimPath>> {
        if is_literal_path(expr) {
            let path = PrimPath::new(expr)?;
            return Ok(if self.has_prim(&path) {
                vec![path]
            } else {
                Vec::new()
            });
        }

        let pattern = PathPattern::new(expr)?;
        let mut out = Vec::new();
        if pattern.matches("/") {
            out.push(PrimPath::root());
        }
        for key in self.prims.keys() {
            if pattern.matches(key.as_str()) {
                out.push(key.clone());
            }
        }
        Ok(out)
    }

    fn define_prim(&mut self, path: &PrimPath, type_name: &str) -> StageResult<()> {
        if path.is_root() || self.prims.contains_key(path) {
            return Err(StageError::PrimExists(path.clone()));
        }
        self.ensure_editable(path)?;
        self.create_ancestors(path);
        self.prims.insert(path.clone(), Prim::new(type_name));
        Ok(())
    }

    fn remove_prim(&mut self, path: &PrimPath) -> StageResult<()> {
        if path.is_root() {
            self.prims.clear();
            self.root = Prim::default();
            return Ok(());
        }
        self.ensure_editable(path)?;
        let keys = self.descendants(path)?;
        for key in keys {
            self.prims.remove(&key);
        }
        Ok(())
    }

    fn set_attribute(&mut self, path: &PrimPath, name: &str, value: Value) -> StageResult<()> {
        self.ensure_editable(path)?;
        match self.prim_mut(path) {
            Some(prim) => {
                prim.attributes.insert(name.to_string(), value);
                Ok(())
            }
            None => Err(StageError::PrimNotFound(path.clone())),
        }
    }

    fn attribute(&self, path: &PrimPath, name: &str) -> Option<&Value> {
        self.prim(path).and_then(|p| p.attributes.get(name))
    }

    fn apply_api(&mut self, path: &PrimPath, api: &str) -> StageResult<()> {
        self.ensure_editable(path)?;
        match self.prim_mut(path) {
            Some(prim) => {
                prim.api_schemas.insert(api.to_string());
                Ok(())
            }
            None => Err(StageError::PrimNotFound(path.clone())),
        }
    }

    fn has_api(&self, path: &PrimPath, api: &str) -> bool {
        self.prim(path)
            .map(|p| p.api_schemas.contains(api))
            .unwrap_or(false)
    }

    fn set_instanceable(&mut self, path: &PrimPath, instanceable: bool) -> StageResult<()> {
        self.ensure_editable(path)?;
        let current = match self.prim(path) {
            Some(p) => p.clone(),
            None => return Err(StageError::PrimNotFound(path.clone())),
        };

        if !instanceable && current.is_instance() {
            if let Some(source) = current.instance_of.as_ref() {
                let source = source.clone();
                self.materialize(&source, path)?;
            }
        }

        if let Some(prim) = self.prim_mut(path) {
            prim.instanceable = instanceable;
            if !instanceable {
                prim.instance_of = None;
            }
        }
        Ok(())
    }

    fn apply_tag(&mut self, path: &PrimPath, label: &str, tag: SemanticTag) -> StageResult<()> {
        self.ensure_editable(path)?;
        match self.prim_mut(path) {
            Some(prim) => {
                prim.tags.insert(label.to_string(), tag);
                Ok(())
            }
            None => Err(StageError::PrimNotFound(path.clone())),
        }
    }

    fn clone_subtree(
        &mut self,
        source: &PrimPath,
        targets: &[PrimPath],
        options: CloneOptions,
    ) -> StageResult<()> {
        self.ensure_exists(source)?;
        for target in targets {
            if self.has_prim(target) {
                return Err(StageError::PrimExists(target.clone()));
            }
            self.ensure_editable(target)?;
        }

        let copy = options.copy_from_source && self.version >= CLONE_COPY_FROM_SOURCE_VERSION;
        let source_type = self
            .prim(source)
            .map(|p| p.type_name.clone())
            .unwrap_or_default();

        for target in targets {
            self.create_ancestors(target);
            if copy {
                self.copy_subtree(source, target)?;
            } else {
                let mut prim = Prim::new(source_type.clone());
                prim.instanceable = true;
                prim.instance_of = Some(source.clone());
                self.prims.insert(target.clone(), prim);
            }
        }

        if options.replicate_physics && !targets.is_empty() {
            self.replications.push(ReplicationGroup {
                source: source.clone(),
                targets: targets.to_vec(),
            });
        }

        log::debug!(
            "cloned '{}' to {} target(s) ({})",
            source,
            targets.len(),
            if copy { "copied" } else { "referenced" }
        );
        Ok(())
    }

    fn host_version(&self) -> u32 {
        self.version
    }
}
