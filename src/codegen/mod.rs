//! TypeScript binding generation.
//!
//! Generation is a pure function of a [`Manifest`]: the same manifest always
//! produces byte-identical `types.ts` and `client.ts`.

mod client;
mod code_writer;
mod ident;
mod render;
mod types;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::manifest::{Event, Manifest, SCHEMA_VERSION};

pub use client::{
    emit_client, emit_client_with, ClientEmitter, NamespacedClient, PositionalClient, Signature,
    CALL_TYPE, TYPES_NAMESPACE,
};
pub use code_writer::{CodeWriter, IndentGuard};
pub use ident::{is_identifier, is_reserved, method_ident, safe_ident};
pub use render::{nullable, render_object, render_type, RenderContext};
pub use types::{emit_types, EVENT_UNION};

/// File name of the type declaration module.
pub const TYPES_FILE: &str = "types.ts";
/// File name of the client module.
pub const CLIENT_FILE: &str = "client.ts";
/// Import specifier the client uses for the type module.
pub const TYPES_MODULE: &str = "./types";

#[derive(Debug, Error)]
pub enum GenerateError {
    /// A `$ref` that is not in the type table. Validated manifests never
    /// produce this.
    #[error("unknown type reference {0:?} (manifest was not resolved)")]
    UnknownType(String),

    #[error("methods map to the same client binding `{binding}` (second: `{method}`)")]
    DuplicateBinding { binding: String, method: String },

    #[error("{module} declares `{name}` twice: for {first} and for {second}")]
    DuplicateDeclaration {
        module: &'static str,
        name: String,
        first: String,
        second: String,
    },

    #[error("parameters of method `{method}` map to the same identifier `{param}`")]
    DuplicateParameter { method: String, param: String },

    #[error("failed to format output: {0}")]
    Format(#[from] fmt::Error),
}

/// How client methods take their arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientStyle {
    /// One argument per parameter; method names in lower camel case.
    #[default]
    Positional,
    /// A single `params` object; method names as declared.
    Namespaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Name of the exported client class.
    pub client_name: String,
    pub style: ClientStyle,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            client_name: "Client".to_string(),
            style: ClientStyle::default(),
        }
    }
}

/// Both generated modules, rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBindings {
    pub types: String,
    pub client: String,
}

impl GeneratedBindings {
    /// `(file name, contents)` pairs in write order.
    pub fn files(&self) -> [(&'static str, &str); 2] {
        [(TYPES_FILE, self.types.as_str()), (CLIENT_FILE, self.client.as_str())]
    }
}

/// Render both modules for a manifest.
pub fn generate(
    manifest: &Manifest,
    options: &GenerateOptions,
) -> Result<GeneratedBindings, GenerateError> {
    let types = emit_types(manifest)?;
    let client = emit_client(manifest, &options.client_name, options.style)?;
    tracing::info!(
        summary = %manifest.summary(),
        style = ?options.style,
        "generated bindings"
    );
    Ok(GeneratedBindings { types, client })
}

/// Top-level names of one generated module, with what each was declared for.
#[derive(Debug)]
pub(crate) struct Declarations {
    module: &'static str,
    names: HashMap<String, String>,
}

impl Declarations {
    pub(crate) fn new(module: &'static str) -> Self {
        Self {
            module,
            names: HashMap::new(),
        }
    }

    /// Claim `name`; fails if something else in the module already holds it.
    pub(crate) fn declare(
        &mut self,
        name: impl Into<String>,
        origin: impl Into<String>,
    ) -> Result<(), GenerateError> {
        match self.names.entry(name.into()) {
            Entry::Occupied(entry) => Err(GenerateError::DuplicateDeclaration {
                module: self.module,
                name: entry.key().clone(),
                first: entry.get().clone(),
                second: origin.into(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(origin.into());
                Ok(())
            }
        }
    }
}

/// The two-line banner at the top of every generated file.
pub(crate) fn write_header<W: fmt::Write>(
    w: &mut CodeWriter<W>,
    manifest: &Manifest,
) -> fmt::Result {
    w.writeln(&format!(
        "// Code generated by abi-codegen from a {SCHEMA_VERSION} manifest. DO NOT EDIT."
    ))?;
    w.writeln(&format!("// abi-hash: {}", manifest.hash()))
}

pub(crate) fn error_code_type_name(method: &crate::manifest::Method) -> String {
    format!("{}ErrorCode", safe_ident(method.name()))
}

pub(crate) fn error_type_name(method: &crate::manifest::Method) -> String {
    format!("{}Error", safe_ident(method.name()))
}

pub(crate) fn event_payload_type_name(event: &Event) -> String {
    format!("{}Payload", safe_ident(event.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "schema_version": "wasm-abi/1",
        "types": {"Point": {"kind": "record", "fields": [
            {"name": "x", "type": {"kind": "f64"}},
            {"name": "y", "type": {"kind": "f64"}}
        ]}},
        "methods": [{"name": "origin", "returns": {"$ref": "Point"}}],
        "events": []
    }"#;

    #[test]
    fn both_files_share_the_header() {
        let manifest = Manifest::from_json_str(MANIFEST).expect("valid manifest");
        let bindings = generate(&manifest, &GenerateOptions::default()).expect("generate");
        let banner = format!(
            "// Code generated by abi-codegen from a wasm-abi/1 manifest. DO NOT EDIT.\n// abi-hash: {}\n",
            manifest.hash().to_hex()
        );
        for (name, contents) in bindings.files() {
            assert!(contents.starts_with(&banner), "{name} is missing the banner");
        }
        assert!(bindings.client.contains("export class Client {"));
    }

    #[test]
    fn client_name_is_made_safe() {
        let manifest = Manifest::from_json_str(MANIFEST).expect("valid manifest");
        let options = GenerateOptions {
            client_name: "class".to_string(),
            style: ClientStyle::Namespaced,
        };
        let bindings = generate(&manifest, &options).expect("generate");
        assert!(bindings.client.contains("export class class_ {"));
        assert!(bindings.client.contains("async origin(): Promise<types.Point> {"));
    }

    #[test]
    fn declarations_report_both_claimants() {
        let mut names = Declarations::new(TYPES_FILE);
        names.declare("Point", "type \"Point\"").unwrap();
        names.declare("Shape", "type \"Shape\"").unwrap();
        match names.declare("Point", "errors of method \"Point\"") {
            Err(GenerateError::DuplicateDeclaration {
                module,
                name,
                first,
                second,
            }) => {
                assert_eq!(module, "types.ts");
                assert_eq!(name, "Point");
                assert_eq!(first, "type \"Point\"");
                assert_eq!(second, "errors of method \"Point\"");
            }
            other => panic!("expected duplicate declaration, got {other:?}"),
        }
    }
}
