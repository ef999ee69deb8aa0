//! The `wasm-abi/1` manifest model.
//!
//! A [`Manifest`] is produced once per run by the parse pipeline:
//!
//! ```text
//! JSON text ─▶ serde_json::Value ─▶ validate ─▶ resolve $refs ─▶ Manifest
//! ```
//!
//! The result is frozen. All fields are private and every accessor hands out
//! shared references, so emitters can walk and alias the structure freely.

mod hash;
mod resolve;
mod types;
mod validation;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

pub use hash::{hash_manifest, ManifestHash};
pub use resolve::ResolveError;
pub use types::*;
pub use validation::SchemaError;

/// The only accepted `schema_version`.
pub const SCHEMA_VERSION: &str = "wasm-abi/1";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// A validated, fully resolved, immutable ABI manifest.
///
/// There is no way to obtain a mutable view of a manifest:
///
/// ```compile_fail
/// let manifest = wasm_abi_codegen::parse_manifest(
///     r#"{"schema_version": "wasm-abi/1", "types": {}, "methods": [], "events": []}"#,
/// ).unwrap();
/// let extra = manifest.methods()[0].clone();
/// manifest.methods().push(extra);
/// ```
///
/// ```compile_fail
/// use wasm_abi_codegen::TypeDef;
///
/// let manifest = wasm_abi_codegen::parse_manifest(r#"{
///     "schema_version": "wasm-abi/1",
///     "types": {"Shape": {"kind": "variant", "variants": [{"name": "dot"}]}},
///     "methods": [],
///     "events": []
/// }"#).unwrap();
/// if let TypeDef::Variant(variants) = &manifest.types()["Shape"] {
///     variants[0].payload = None;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    types: IndexMap<String, TypeDef>,
    methods: Vec<Method>,
    events: Vec<Event>,
}

impl Manifest {
    /// Parse, validate and resolve a manifest from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&document)
    }

    /// Parse, validate and resolve a manifest from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let document: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(&document)
    }

    /// Validate and resolve an already parsed JSON document.
    pub fn from_value(document: &serde_json::Value) -> Result<Self, ManifestError> {
        let validated = validation::validate(document)?;
        resolve::resolve_references(&validated)?;

        Ok(Self {
            types: validated.types,
            methods: validated.methods,
            events: validated.events,
        })
    }

    /// Named type definitions, in document order.
    pub fn types(&self) -> &IndexMap<String, TypeDef> {
        &self.types
    }

    /// Find a type definition by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Find a method by its ABI name.
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary {
            methods: self.methods.len(),
            events: self.events.len(),
            types: self.types.len(),
        }
    }

    /// Structural fingerprint of this manifest.
    pub fn hash(&self) -> ManifestHash {
        hash_manifest(self)
    }
}

/// Parse, validate and resolve a manifest from JSON text.
pub fn parse_manifest(json: &str) -> Result<Manifest, ManifestError> {
    Manifest::from_json_str(json)
}

/// Declaration counts, as reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub methods: usize,
    pub events: usize,
    pub types: usize,
}

impl fmt::Display for ManifestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} methods, {} events, {} types",
            self.methods, self.events, self.types
        )
    }
}
