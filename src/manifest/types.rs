//! Manifest node types.
//!
//! These are the decoded, read-only building blocks of a [`Manifest`](super::Manifest).
//! Every node decodes straight from its JSON form; struct fields are private and
//! only exposed through shared-reference accessors.

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;

// ============================================================================
// TypeRef - Type References
// ============================================================================

/// A reference to a type, usable anywhere the manifest expects a type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTypeRef")]
pub enum TypeRef {
    /// `{"$ref": "Name"}` - a named entry in the manifest's type table.
    Named(String),
    /// `{"kind": "<primitive>"}`
    Primitive(Primitive),
    /// `{"kind": "list", "items": ...}`
    List(Box<TypeRef>),
    /// `{"kind": "map", "key": ..., "value": ...}`
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    /// `{"kind": "record", "fields": [...]}` - an anonymous structure.
    Record(Vec<Field>),
}

impl TypeRef {
    /// Check whether this is the `unit` primitive.
    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Primitive(Primitive::Unit))
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeRef::Named(_) => "$ref",
            TypeRef::Primitive(p) => p.as_str(),
            TypeRef::List(_) => "list",
            TypeRef::Map { .. } => "map",
            TypeRef::Record(_) => "record",
        }
    }

    /// Visit this node and every node nested inside it, depth first.
    ///
    /// `location` describes where this node sits in the manifest; nested nodes
    /// get it extended (`.items`, `.key`, `.value`, `.<field>`).
    pub(crate) fn visit<E>(
        &self,
        location: &str,
        f: &mut impl FnMut(&TypeRef, &str) -> Result<(), E>,
    ) -> Result<(), E> {
        f(self, location)?;
        match self {
            TypeRef::Named(_) | TypeRef::Primitive(_) => Ok(()),
            TypeRef::List(items) => items.visit(&format!("{location}.items"), f),
            TypeRef::Map { key, value } => {
                key.visit(&format!("{location}.key"), f)?;
                value.visit(&format!("{location}.value"), f)
            }
            TypeRef::Record(fields) => {
                for field in fields {
                    field.ty.visit(&format!("{location}.{}", field.name), f)?;
                }
                Ok(())
            }
        }
    }
}

/// Primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Unit,
    Bytes,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::String => "string",
            Primitive::Unit => "unit",
            Primitive::Bytes => "bytes",
        }
    }

    /// Check whether this is one of the numeric primitives.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Primitive::I32
                | Primitive::I64
                | Primitive::U32
                | Primitive::U64
                | Primitive::F32
                | Primitive::F64
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized forms of a [`TypeRef`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Named(RefNode),
    Kind(KindNode),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RefNode {
    #[serde(rename = "$ref")]
    name: String,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
enum KindNode {
    // Empty struct variants: unit variants would ignore extra keys.
    Bool {},
    I32 {},
    I64 {},
    U32 {},
    U64 {},
    F32 {},
    F64 {},
    String {},
    Unit {},
    Bytes {},
    List { items: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Record { fields: Vec<Field> },
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        let kind = match raw {
            RawTypeRef::Named(node) => return TypeRef::Named(node.name),
            RawTypeRef::Kind(kind) => kind,
        };
        match kind {
            KindNode::Bool {} => TypeRef::Primitive(Primitive::Bool),
            KindNode::I32 {} => TypeRef::Primitive(Primitive::I32),
            KindNode::I64 {} => TypeRef::Primitive(Primitive::I64),
            KindNode::U32 {} => TypeRef::Primitive(Primitive::U32),
            KindNode::U64 {} => TypeRef::Primitive(Primitive::U64),
            KindNode::F32 {} => TypeRef::Primitive(Primitive::F32),
            KindNode::F64 {} => TypeRef::Primitive(Primitive::F64),
            KindNode::String {} => TypeRef::Primitive(Primitive::String),
            KindNode::Unit {} => TypeRef::Primitive(Primitive::Unit),
            KindNode::Bytes {} => TypeRef::Primitive(Primitive::Bytes),
            KindNode::List { items } => TypeRef::List(items),
            KindNode::Map { key, value } => TypeRef::Map { key, value },
            KindNode::Record { fields } => TypeRef::Record(fields),
        }
    }
}

// ============================================================================
// TypeDef - Named Type Definitions
// ============================================================================

/// A named entry in the manifest's type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    /// `{"kind": "record", "fields": [...]}`
    Record(Vec<Field>),
    /// `{"kind": "variant", "variants": [...]}`
    Variant(Vec<Variant>),
    /// `{"kind": "bytes", "size"?: n}` - fixed length when `size` is present.
    Bytes { size: Option<NonZeroU64> },
}

impl TypeDef {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDef::Record(_) => "record",
            TypeDef::Variant(_) => "variant",
            TypeDef::Bytes { .. } => "bytes",
        }
    }
}

/// A record field, inline record field, or (structurally identical) method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    name: String,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    nullable: bool,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// Method parameters share the field shape.
pub type Param = Field;

/// One arm of a variant type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variant {
    name: String,
    #[serde(default)]
    payload: Option<TypeRef>,
}

impl Variant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> Option<&TypeRef> {
        self.payload.as_ref()
    }
}

// ============================================================================
// Method / Event
// ============================================================================

/// A remotely callable method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Method {
    name: String,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(default)]
    returns: Option<TypeRef>,
    #[serde(default)]
    returns_nullable: bool,
    #[serde(default)]
    errors: Option<Vec<ErrorCase>>,
}

impl Method {
    /// The ABI (wire) name. Never altered by code generation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declared order. This order is the call contract.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn returns(&self) -> Option<&TypeRef> {
        self.returns.as_ref()
    }

    pub fn returns_nullable(&self) -> bool {
        self.returns_nullable
    }

    /// Declared error cases; empty when the method declares none.
    pub fn errors(&self) -> &[ErrorCase] {
        self.errors.as_deref().unwrap_or(&[])
    }

    /// Return type, treating `unit` like an absent return.
    pub fn value_return(&self) -> Option<&TypeRef> {
        self.returns.as_ref().filter(|ty| !ty.is_unit())
    }
}

/// A declared failure mode of a method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorCase {
    code: String,
    #[serde(default)]
    payload: Option<TypeRef>,
}

impl ErrorCase {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn payload(&self) -> Option<&TypeRef> {
        self.payload.as_ref()
    }
}

/// An event the remote application can publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    payload: Option<TypeRef>,
}

impl Event {
    /// Build an event, folding a `unit` payload into "no payload".
    pub(crate) fn new(name: String, payload: Option<TypeRef>) -> Self {
        Self {
            name,
            payload: payload.filter(|ty| !ty.is_unit()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event payload; `None` for both an absent and a `unit` payload.
    pub fn payload(&self) -> Option<&TypeRef> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_ref(value: serde_json::Value) -> TypeRef {
        serde_json::from_value(value).expect("decode type ref")
    }

    #[test]
    fn decodes_named_reference() {
        assert_eq!(
            type_ref(json!({"$ref": "Person"})),
            TypeRef::Named("Person".to_string())
        );
    }

    #[test]
    fn decodes_nested_containers() {
        let ty = type_ref(json!({
            "kind": "map",
            "key": {"kind": "string"},
            "value": {"kind": "list", "items": {"kind": "u64"}}
        }));
        match ty {
            TypeRef::Map { key, value } => {
                assert_eq!(*key, TypeRef::Primitive(Primitive::String));
                assert_eq!(
                    *value,
                    TypeRef::List(Box::new(TypeRef::Primitive(Primitive::U64)))
                );
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn decodes_inline_record_with_nullable_field() {
        let ty = type_ref(json!({
            "kind": "record",
            "fields": [
                {"name": "id", "type": {"kind": "i64"}},
                {"name": "note", "type": {"kind": "string"}, "nullable": true}
            ]
        }));
        let TypeRef::Record(fields) = ty else {
            panic!("expected inline record");
        };
        assert_eq!(fields.len(), 2);
        assert!(!fields[0].nullable());
        assert!(fields[1].nullable());
        assert_eq!(fields[1].name(), "note");
    }

    #[test]
    fn rejects_unknown_kind_and_mixed_shapes() {
        assert!(serde_json::from_value::<TypeRef>(json!({"kind": "u128"})).is_err());
        assert!(serde_json::from_value::<TypeRef>(json!({"kind": "list"})).is_err());
        assert!(serde_json::from_value::<TypeRef>(json!({"$ref": "A", "extra": 1})).is_err());
        assert!(serde_json::from_value::<TypeRef>(json!("string")).is_err());
    }

    #[test]
    fn primitives_reject_extra_keys() {
        for extra in [
            json!({"kind": "string", "$ref": "Nope"}),
            json!({"kind": "string", "items": {"kind": "u32"}}),
            json!({"kind": "unit", "size": 4}),
        ] {
            assert!(
                serde_json::from_value::<TypeRef>(extra.clone()).is_err(),
                "{extra} should not decode"
            );
        }
        assert_eq!(
            type_ref(json!({"kind": "bytes"})),
            TypeRef::Primitive(Primitive::Bytes)
        );
    }

    #[test]
    fn unit_event_payload_is_folded() {
        let event = Event::new("Ping".into(), Some(TypeRef::Primitive(Primitive::Unit)));
        assert_eq!(event.payload(), None);
        assert_eq!(event, Event::new("Ping".into(), None));
    }

    #[test]
    fn visit_reports_nested_locations() {
        let ty = type_ref(json!({
            "kind": "record",
            "fields": [{"name": "tags", "type": {"kind": "list", "items": {"$ref": "Tag"}}}]
        }));
        let mut seen = Vec::new();
        ty.visit::<()>("root", &mut |node, location| {
            seen.push((node.kind_name(), location.to_string()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("record", "root".to_string()),
                ("list", "root.tags".to_string()),
                ("$ref", "root.tags.items".to_string()),
            ]
        );
    }
}
