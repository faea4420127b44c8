//! Prim records.
//!
//! A prim is one node of the stage hierarchy: a schema type name plus
//! applied API schemas, authored attributes, semantic tags, and
//! instancing state. All collections are ordered maps so enumeration
//! is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::path::PrimPath;
use crate::value::Value;

/// A semantic label attached to a prim.
///
/// Category and value are stored exactly as given; the map key under
/// which a tag is filed is a sanitized label derived by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticTag {
    /// Tag category, e.g. "object type"
    pub category: String,

    /// Tag value, e.g. "soda can"
    pub value: String,
}

impl SemanticTag {
    /// Create a new tag.
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

/// A node in the stage hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Prim {
    /// Schema type name, e.g. "Xform" or "Cube". Empty for placeholder
    /// prims created implicitly as missing ancestors.
    pub type_name: String,

    /// Whether this prim may be instanced.
    pub instanceable: bool,

    /// Source subtree when this prim was cloned by reference.
    pub instance_of: Option<PrimPath>,

    /// Applied API schema names.
    pub api_schemas: BTreeSet<String>,

    /// Authored attributes by name.
    pub attributes: BTreeMap<String, Value>,

    /// Semantic tags by sanitized label.
    pub tags: BTreeMap<String, SemanticTag>,
}

impl Prim {
    /// Create a prim of the given type with no authored data.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Whether this prim is an instance proxy sharing another
    /// subtree's data. Proxies are opaque: they expose no children and
    /// reject edits beneath them.
    pub fn is_instance(&self) -> bool {
        self.instanceable && self.instance_of.is_some()
    }

    /// Whether the prim has an authored (non-placeholder) type.
    pub fn is_typed(&self) -> bool {
        !self.type_name.is_empty()
    }
}
