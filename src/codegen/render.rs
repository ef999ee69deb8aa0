//! TypeScript rendering of type references.

use crate::manifest::{Field, Manifest, Primitive, TypeRef};

use super::ident::{property_key, safe_ident};
use super::GenerateError;

/// Lookup scope for [`render_type`].
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    manifest: &'a Manifest,
    namespace: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        Self {
            manifest,
            namespace: None,
        }
    }

    /// Qualify named references with `namespace.` (e.g. `types.Person`).
    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn manifest(&self) -> &'a Manifest {
        self.manifest
    }

    /// Name of a generated declaration as seen from this scope.
    pub fn qualify(&self, ident: &str) -> String {
        match self.namespace {
            Some(namespace) => format!("{namespace}.{ident}"),
            None => ident.to_string(),
        }
    }
}

/// Render a type reference as a TypeScript type expression.
///
/// Named references are looked up in the manifest's type table and rendered
/// by name only, so cyclic types never recurse. Nullability is the caller's
/// business; see [`nullable`].
pub fn render_type(ty: &TypeRef, cx: &RenderContext<'_>) -> Result<String, GenerateError> {
    Ok(match ty {
        TypeRef::Named(name) => {
            if cx.manifest.find_type(name).is_none() {
                return Err(GenerateError::UnknownType(name.clone()));
            }
            cx.qualify(&safe_ident(name))
        }
        TypeRef::Primitive(primitive) => render_primitive(*primitive).to_string(),
        TypeRef::List(items) => format!("{}[]", render_type(items, cx)?),
        TypeRef::Map { key, value } => format!(
            "Record<{}, {}>",
            render_type(key, cx)?,
            render_type(value, cx)?
        ),
        TypeRef::Record(fields) => render_object(fields, cx)?,
    })
}

fn render_primitive(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Bool => "boolean",
        Primitive::I32
        | Primitive::I64
        | Primitive::U32
        | Primitive::U64
        | Primitive::F32
        | Primitive::F64 => "number",
        Primitive::String => "string",
        Primitive::Unit => "void",
        Primitive::Bytes => "Uint8Array",
    }
}

/// Render an anonymous object type: `{ a: A; b: B | null }`.
pub fn render_object(fields: &[Field], cx: &RenderContext<'_>) -> Result<String, GenerateError> {
    if fields.is_empty() {
        return Ok("{}".to_string());
    }
    let members = fields
        .iter()
        .map(|field| render_member(field, cx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{{ {} }}", members.join("; ")))
}

/// Render `key: Type` (with `| null` when nullable) for one field or parameter.
pub fn render_member(field: &Field, cx: &RenderContext<'_>) -> Result<String, GenerateError> {
    Ok(format!(
        "{}: {}",
        property_key(field.name()),
        nullable(render_type(field.ty(), cx)?, field.nullable())
    ))
}

/// Union a rendered type with `null` when `nullable` is set.
pub fn nullable(rendered: String, nullable: bool) -> String {
    if nullable {
        format!("{rendered} | null")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> Manifest {
        Manifest::from_value(&json!({
            "schema_version": "wasm-abi/1",
            "types": {
                "Person": {"kind": "record", "fields": []},
                "default": {"kind": "bytes"}
            },
            "methods": [],
            "events": []
        }))
        .unwrap()
    }

    fn render(manifest: &Manifest, value: serde_json::Value) -> String {
        let ty: TypeRef = serde_json::from_value(value).unwrap();
        render_type(&ty, &RenderContext::new(manifest)).unwrap()
    }

    #[test]
    fn primitives() {
        let m = manifest();
        assert_eq!(render(&m, json!({"kind": "bool"})), "boolean");
        for numeric in ["i32", "i64", "u32", "u64", "f32", "f64"] {
            assert_eq!(render(&m, json!({"kind": numeric})), "number");
        }
        assert_eq!(render(&m, json!({"kind": "string"})), "string");
        assert_eq!(render(&m, json!({"kind": "unit"})), "void");
        assert_eq!(render(&m, json!({"kind": "bytes"})), "Uint8Array");
    }

    #[test]
    fn containers() {
        let m = manifest();
        assert_eq!(
            render(&m, json!({"kind": "list", "items": {"$ref": "Person"}})),
            "Person[]"
        );
        assert_eq!(
            render(&m, json!({
                "kind": "map",
                "key": {"kind": "string"},
                "value": {"kind": "list", "items": {"kind": "u32"}}
            })),
            "Record<string, number[]>"
        );
    }

    #[test]
    fn inline_record_fields_are_independently_nullable() {
        let m = manifest();
        assert_eq!(
            render(&m, json!({"kind": "record", "fields": [
                {"name": "person", "type": {"$ref": "Person"}},
                {"name": "note", "type": {"kind": "string"}, "nullable": true},
                {"name": "x-trace", "type": {"kind": "u64"}}
            ]})),
            "{ person: Person; note: string | null; \"x-trace\": number }"
        );
        assert_eq!(render(&m, json!({"kind": "record", "fields": []})), "{}");
    }

    #[test]
    fn named_references_are_made_safe_and_qualified() {
        let m = manifest();
        let ty = TypeRef::Named("default".to_string());
        let cx = RenderContext::new(&m).with_namespace("types");
        assert_eq!(render_type(&ty, &cx).unwrap(), "types.default_");
    }

    #[test]
    fn unknown_reference_is_an_internal_error() {
        let m = manifest();
        let ty = TypeRef::Named("Ghost".to_string());
        assert!(matches!(
            render_type(&ty, &RenderContext::new(&m)),
            Err(GenerateError::UnknownType(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn nullable_is_applied_by_caller() {
        assert_eq!(nullable("string".to_string(), true), "string | null");
        assert_eq!(nullable("string".to_string(), false), "string");
    }
}
