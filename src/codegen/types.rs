//! Type declaration module (`types.ts`).
//!
//! Declarations are emitted in manifest order:
//! 1. one declaration per named type,
//! 2. error code / error unions per method that declares errors,
//! 3. payload aliases per event with a payload,
//! 4. the `AbiEvent` union when the manifest has events.

use crate::manifest::{Field, Manifest, TypeDef, Variant};

use super::code_writer::CodeWriter;
use super::ident::{safe_ident, string_literal};
use super::render::{render_member, render_type, RenderContext};
use super::{
    error_code_type_name, error_type_name, event_payload_type_name, write_header, Declarations,
    GenerateError, TYPES_FILE,
};

/// Name of the discriminated union of all events.
pub const EVENT_UNION: &str = "AbiEvent";

/// Claim every name the type module exports, in emission order.
pub(crate) fn declare_types(
    names: &mut Declarations,
    manifest: &Manifest,
) -> Result<(), GenerateError> {
    for name in manifest.types().keys() {
        names.declare(safe_ident(name), format!("type {name:?}"))?;
    }
    for method in manifest.methods() {
        if !method.errors().is_empty() {
            let origin = format!("errors of method {:?}", method.name());
            names.declare(error_code_type_name(method), origin.clone())?;
            names.declare(error_type_name(method), origin)?;
        }
    }
    for event in manifest.events() {
        if event.payload().is_some() {
            names.declare(
                event_payload_type_name(event),
                format!("payload of event {:?}", event.name()),
            )?;
        }
    }
    if !manifest.events().is_empty() {
        names.declare(EVENT_UNION, "the event union")?;
    }
    Ok(())
}

/// Emit the full type declaration module for a manifest.
pub fn emit_types(manifest: &Manifest) -> Result<String, GenerateError> {
    declare_types(&mut Declarations::new(TYPES_FILE), manifest)?;

    let cx = RenderContext::new(manifest);
    let mut w = CodeWriter::with_indent_spaces(String::new(), 2);
    write_header(&mut w, manifest)?;

    for (name, def) in manifest.types() {
        w.blank_line()?;
        emit_type_def(&mut w, &cx, name, def)?;
    }

    for method in manifest.methods() {
        let errors = method.errors();
        if errors.is_empty() {
            continue;
        }

        let codes = errors
            .iter()
            .map(|case| string_literal(case.code()))
            .collect::<Vec<_>>()
            .join(" | ");
        w.blank_line()?;
        w.writeln(&format!(
            "export type {} = {codes};",
            error_code_type_name(method)
        ))?;

        let mut arms = Vec::with_capacity(errors.len());
        for case in errors {
            let code = format!("{{ code: {} }}", string_literal(case.code()));
            arms.push(match case.payload() {
                Some(payload) => format!("{code} & {{ payload: {} }}", render_type(payload, &cx)?),
                None => code,
            });
        }
        w.blank_line()?;
        write_union(&mut w, &error_type_name(method), &arms)?;
    }

    for event in manifest.events() {
        if let Some(payload) = event.payload() {
            w.blank_line()?;
            w.writeln(&format!(
                "export type {} = {};",
                event_payload_type_name(event),
                render_type(payload, &cx)?
            ))?;
        }
    }

    if !manifest.events().is_empty() {
        let mut arms = Vec::with_capacity(manifest.events().len());
        for event in manifest.events() {
            let name = string_literal(event.name());
            arms.push(match event.payload() {
                Some(payload) => format!(
                    "{{ name: {name}; payload: {} }}",
                    render_type(payload, &cx)?
                ),
                None => format!("{{ name: {name} }}"),
            });
        }
        w.blank_line()?;
        write_union(&mut w, EVENT_UNION, &arms)?;
    }

    tracing::debug!(
        types = manifest.types().len(),
        "emitted type declarations"
    );
    Ok(w.into_inner())
}

fn emit_type_def(
    w: &mut CodeWriter<String>,
    cx: &RenderContext<'_>,
    name: &str,
    def: &TypeDef,
) -> Result<(), GenerateError> {
    let ident = safe_ident(name);
    match def {
        TypeDef::Record(fields) => emit_interface(w, cx, &ident, fields),
        TypeDef::Variant(variants) => {
            let arms = variants
                .iter()
                .map(|variant| variant_arm(cx, variant))
                .collect::<Result<Vec<_>, _>>()?;
            write_union(w, &ident, &arms)?;
            Ok(())
        }
        TypeDef::Bytes { size } => {
            if let Some(size) = size {
                w.writeln(&format!("/** Fixed-length: {size} bytes. */"))?;
            }
            w.writeln(&format!("export type {ident} = Uint8Array;"))?;
            Ok(())
        }
    }
}

fn emit_interface(
    w: &mut CodeWriter<String>,
    cx: &RenderContext<'_>,
    ident: &str,
    fields: &[Field],
) -> Result<(), GenerateError> {
    if fields.is_empty() {
        w.writeln(&format!("export interface {ident} {{}}"))?;
        return Ok(());
    }

    w.writeln(&format!("export interface {ident} {{"))?;
    {
        let _indent = w.indent();
        for field in fields {
            w.writeln(&format!("{};", render_member(field, cx)?))?;
        }
    }
    w.writeln("}")?;
    Ok(())
}

fn variant_arm(cx: &RenderContext<'_>, variant: &Variant) -> Result<String, GenerateError> {
    let kind = string_literal(variant.name());
    Ok(match variant.payload().filter(|ty| !ty.is_unit()) {
        Some(payload) => format!("{{ kind: {kind}; payload: {} }}", render_type(payload, cx)?),
        None => format!("{{ kind: {kind} }}"),
    })
}

/// `export type Name =` followed by one `| arm` line per arm; `never` when empty.
fn write_union(
    w: &mut CodeWriter<String>,
    ident: &str,
    arms: &[String],
) -> Result<(), GenerateError> {
    if arms.is_empty() {
        w.writeln(&format!("export type {ident} = never;"))?;
        return Ok(());
    }

    w.writeln(&format!("export type {ident} ="))?;
    let _indent = w.indent();
    let last = arms.len() - 1;
    for (i, arm) in arms.iter().enumerate() {
        let terminator = if i == last { ";" } else { "" };
        w.writeln(&format!("| {arm}{terminator}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emit(doc: serde_json::Value) -> String {
        let manifest = Manifest::from_value(&doc).expect("valid manifest");
        emit_types(&manifest).expect("emit types")
    }

    /// Everything after the two header lines.
    fn body(output: &str) -> String {
        output.lines().skip(2).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn variant_arms_with_and_without_payload() {
        let output = emit(json!({
            "schema_version": "wasm-abi/1",
            "types": {
                "Shape": {"kind": "variant", "variants": [
                    {"name": "circle", "payload": {"kind": "f64"}},
                    {"name": "none"},
                    {"name": "tagged", "payload": {"kind": "unit"}}
                ]}
            },
            "methods": [],
            "events": []
        }));
        assert_eq!(
            body(&output),
            "\nexport type Shape =\n  | { kind: \"circle\"; payload: number }\n  | { kind: \"none\" }\n  | { kind: \"tagged\" };"
        );
    }

    #[test]
    fn bytes_aliases() {
        let output = emit(json!({
            "schema_version": "wasm-abi/1",
            "types": {
                "Hash": {"kind": "bytes", "size": 32},
                "Blob": {"kind": "bytes"}
            },
            "methods": [],
            "events": []
        }));
        assert!(output.contains("/** Fixed-length: 32 bytes. */\nexport type Hash = Uint8Array;\n"));
        assert!(output.contains("\n\nexport type Blob = Uint8Array;\n"));
    }

    #[test]
    fn empty_declarations() {
        let output = emit(json!({
            "schema_version": "wasm-abi/1",
            "types": {
                "Nothing": {"kind": "record", "fields": []},
                "Never": {"kind": "variant", "variants": []}
            },
            "methods": [],
            "events": []
        }));
        assert!(output.contains("export interface Nothing {}\n"));
        assert!(output.contains("export type Never = never;\n"));
        assert!(!output.contains(EVENT_UNION));
    }

    #[test]
    fn error_unions_carry_payloads() {
        let output = emit(json!({
            "schema_version": "wasm-abi/1",
            "types": {},
            "methods": [{
                "name": "transfer",
                "params": [],
                "errors": [
                    {"code": "INSUFFICIENT_FUNDS", "payload": {"kind": "record", "fields": [
                        {"name": "missing", "type": {"kind": "u64"}}
                    ]}},
                    {"code": "FROZEN"}
                ]
            }],
            "events": []
        }));
        assert!(output.contains(
            "export type transferErrorCode = \"INSUFFICIENT_FUNDS\" | \"FROZEN\";\n"
        ));
        assert!(output.contains(
            "export type transferError =\n  | { code: \"INSUFFICIENT_FUNDS\" } & { payload: { missing: number } }\n  | { code: \"FROZEN\" };\n"
        ));
    }

    fn emit_err(doc: serde_json::Value) -> GenerateError {
        let manifest = Manifest::from_value(&doc).expect("valid manifest");
        emit_types(&manifest).expect_err("names should collide")
    }

    #[test]
    fn colliding_declarations_are_rejected() {
        let cases = [
            (
                json!({"a-b": {"kind": "bytes"}, "a_b": {"kind": "record", "fields": []}}),
                json!([]),
                json!([]),
                "a_b",
            ),
            (
                json!({"pingError": {"kind": "bytes"}}),
                json!([{"name": "ping", "errors": [{"code": "DOWN"}]}]),
                json!([]),
                "pingError",
            ),
            (
                json!({"AbiEvent": {"kind": "bytes"}}),
                json!([]),
                json!([{"name": "Tick"}]),
                "AbiEvent",
            ),
            (
                json!({}),
                json!([]),
                json!([
                    {"name": "Tick", "payload": {"kind": "u64"}},
                    {"name": "Tick", "payload": {"kind": "string"}}
                ]),
                "TickPayload",
            ),
        ];
        for (types, methods, events, clash) in cases {
            let err = emit_err(json!({
                "schema_version": "wasm-abi/1",
                "types": types,
                "methods": methods,
                "events": events
            }));
            match err {
                GenerateError::DuplicateDeclaration { module, name, .. } => {
                    assert_eq!(module, "types.ts");
                    assert_eq!(name, clash);
                }
                other => panic!("expected duplicate declaration of {clash}, got {other:?}"),
            }
        }
    }

    #[test]
    fn methods_without_errors_emit_nothing() {
        let output = emit(json!({
            "schema_version": "wasm-abi/1",
            "types": {},
            "methods": [{"name": "ping", "params": [], "errors": []}],
            "events": []
        }));
        assert!(!output.contains("pingError"));
    }
}
