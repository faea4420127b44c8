//! Attribute values.
//!
//! Attributes carry explicitly tagged values: the caller states the
//! type up front instead of the stage inferring it from inspection.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A typed attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean flag
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Scalar float
    Float(f32),

    /// 2-component float vector
    Float2(Vec2),

    /// 3-component float vector
    Float3(Vec3),

    /// Token: a short string from a fixed vocabulary
    Token(String),

    /// Free-form string
    Str(String),
}

impl Value {
    /// Short name of the carried type, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Float2(_) => "float2",
            Value::Float3(_) => "float3",
            Value::Token(_) => "token",
            Value::Str(_) => "string",
        }
    }

    /// Convenience constructor for token values.
    pub fn token(s: impl Into<String>) -> Self {
        Value::Token(s.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Float2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Float3(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Bool(true).kind(), "bool");
        assert_eq!(Value::Int(3).kind(), "int");
        assert_eq!(Value::Float(1.5).kind(), "float");
        assert_eq!(Value::Float3(Vec3::ONE).kind(), "float3");
        assert_eq!(Value::token("inherited").kind(), "token");
        assert_eq!(Value::Str("hello".to_string()).kind(), "string");
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(2.0_f32), Value::Float(2.0));
        assert_eq!(
            Value::from(Vec3::new(1.0, 2.0, 3.0)),
            Value::Float3(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let value = Value::Float3(Vec3::new(0.5, 0.25, 1.0));
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
