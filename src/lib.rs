//! wasm-abi-codegen: typed TypeScript bindings from `wasm-abi/1` manifests
//!
//! A manifest describes the methods, events and types a remote application
//! exposes. This crate validates it, resolves its type references and emits
//! two modules: `types.ts` (declarations) and `client.ts` (a client class that
//! forwards calls to an injected transport primitive).
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌──────────┐   ┌──────────────┐
//! │ manifest JSON│──▶│ validate │──▶│ resolve  │──▶│   Manifest   │
//! └──────────────┘   └──────────┘   └──────────┘   └──────┬───────┘
//!                                                         │
//!                                   ┌─────────────────────┼─────────────┐
//!                                   ▼                                   ▼
//!                             emit_types                          emit_client
//!                             (types.ts)                          (client.ts)
//! ```
//!
//! Named types may reference each other cyclically; references are rendered
//! by name only, so generation always terminates.
//!
//! ## Example
//!
//! ```
//! use wasm_abi_codegen::{generate, parse_manifest, GenerateOptions};
//!
//! let manifest = parse_manifest(r#"{
//!     "schema_version": "wasm-abi/1",
//!     "types": {},
//!     "methods": [{"name": "get_count", "returns": {"kind": "u32"}}],
//!     "events": []
//! }"#).unwrap();
//!
//! let bindings = generate(&manifest, &GenerateOptions::default()).unwrap();
//! assert!(bindings.client.contains("async getCount(): Promise<number>"));
//! ```

pub mod codegen;
pub mod manifest;

pub use codegen::{
    emit_client, emit_types, generate, render_type, ClientEmitter, ClientStyle, GenerateError,
    GenerateOptions, GeneratedBindings, RenderContext, CLIENT_FILE, TYPES_FILE,
};
pub use manifest::{
    hash_manifest, parse_manifest, ErrorCase, Event, Field, Manifest, ManifestError, ManifestHash,
    ManifestSummary, Method, Param, Primitive, ResolveError, SchemaError, TypeDef, TypeRef,
    Variant, SCHEMA_VERSION,
};
