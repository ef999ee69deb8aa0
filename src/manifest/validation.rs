//! Structural validation of `wasm-abi/1` documents.
//!
//! Decoding goes straight from JSON into the typed node model; the checks that
//! serde cannot express (schema version, fixed-size bytes, map keys, legacy
//! event shapes) run on the decoded form.

use std::num::NonZeroU64;

use indexmap::IndexMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::types::{Event, Field, Method, Primitive, TypeDef, TypeRef, Variant};
use super::SCHEMA_VERSION;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema validation failed: unsupported schema_version {found:?} (expected {expected:?})")]
    UnsupportedVersion {
        found: String,
        expected: &'static str,
    },
    #[error("schema validation failed: event {event:?} declares `type`; event payloads must be declared with `payload`")]
    EventTypeField { event: String },
    #[error("schema validation failed: bytes type {name:?} has size 0; fixed-length bytes need a positive size, variable-length bytes omit `size`")]
    ZeroSizeBytes { name: String },
    #[error("schema validation failed: map key must be string type (found {found} at {location})")]
    NonStringMapKey {
        location: String,
        found: &'static str,
    },
    #[error("schema validation failed: {0}")]
    Malformed(String),
}

/// A structurally valid manifest whose references have not been checked yet.
#[derive(Debug)]
pub(crate) struct Validated {
    pub(crate) types: IndexMap<String, TypeDef>,
    pub(crate) methods: Vec<Method>,
    pub(crate) events: Vec<Event>,
}

impl Validated {
    /// Visit every type reference reachable from the type table, methods and
    /// events, in document order, with a dotted location for diagnostics.
    pub(crate) fn visit_type_refs<E>(
        &self,
        f: &mut impl FnMut(&TypeRef, &str) -> Result<(), E>,
    ) -> Result<(), E> {
        for (name, def) in &self.types {
            match def {
                TypeDef::Record(fields) => {
                    for field in fields {
                        field
                            .ty()
                            .visit(&format!("types.{name}.{}", field.name()), f)?;
                    }
                }
                TypeDef::Variant(variants) => {
                    for variant in variants {
                        if let Some(payload) = variant.payload() {
                            payload.visit(&format!("types.{name}.{}", variant.name()), f)?;
                        }
                    }
                }
                TypeDef::Bytes { .. } => {}
            }
        }

        for method in &self.methods {
            let prefix = format!("methods.{}", method.name());
            for param in method.params() {
                param
                    .ty()
                    .visit(&format!("{prefix}.params.{}", param.name()), f)?;
            }
            if let Some(returns) = method.returns() {
                returns.visit(&format!("{prefix}.returns"), f)?;
            }
            for case in method.errors() {
                if let Some(payload) = case.payload() {
                    payload.visit(&format!("{prefix}.errors.{}", case.code()), f)?;
                }
            }
        }

        for event in &self.events {
            if let Some(payload) = event.payload() {
                payload.visit(&format!("events.{}.payload", event.name()), f)?;
            }
        }

        Ok(())
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    schema_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    schema_version: String,
    types: IndexMap<String, RawTypeDef>,
    methods: Vec<Method>,
    events: Vec<RawEvent>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
enum RawTypeDef {
    Record {
        fields: Vec<Field>,
    },
    Variant {
        variants: Vec<Variant>,
    },
    Bytes {
        #[serde(default)]
        size: Option<u64>,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvent {
    name: String,
    #[serde(default)]
    payload: Option<TypeRef>,
    /// Set when a `type` key is present at all, `null` included.
    #[serde(default, rename = "type", deserialize_with = "key_present")]
    legacy_type: bool,
}

fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

/// Validate a parsed JSON document against the `wasm-abi/1` shape.
pub(crate) fn validate(document: &serde_json::Value) -> Result<Validated, SchemaError> {
    let probe = VersionProbe::deserialize(document)
        .map_err(|_| SchemaError::Malformed("manifest must be a JSON object".to_string()))?;
    match probe.schema_version {
        Some(version) if version == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(SchemaError::UnsupportedVersion {
                found,
                expected: SCHEMA_VERSION,
            })
        }
        None => {
            return Err(SchemaError::Malformed(
                "missing field `schema_version`".to_string(),
            ))
        }
    }

    let raw = RawManifest::deserialize(document)
        .map_err(|err| SchemaError::Malformed(err.to_string()))?;

    let mut types = IndexMap::with_capacity(raw.types.len());
    for (name, def) in raw.types {
        let def = match def {
            RawTypeDef::Record { fields } => TypeDef::Record(fields),
            RawTypeDef::Variant { variants } => TypeDef::Variant(variants),
            RawTypeDef::Bytes { size: None } => TypeDef::Bytes { size: None },
            RawTypeDef::Bytes { size: Some(size) } => match NonZeroU64::new(size) {
                Some(size) => TypeDef::Bytes { size: Some(size) },
                None => return Err(SchemaError::ZeroSizeBytes { name }),
            },
        };
        types.insert(name, def);
    }

    let mut events = Vec::with_capacity(raw.events.len());
    for event in raw.events {
        if event.legacy_type {
            return Err(SchemaError::EventTypeField { event: event.name });
        }
        events.push(Event::new(event.name, event.payload));
    }

    let validated = Validated {
        types,
        methods: raw.methods,
        events,
    };

    validated.visit_type_refs(&mut |node, location| match node {
        TypeRef::Map { key, .. } if !matches!(**key, TypeRef::Primitive(Primitive::String)) => {
            Err(SchemaError::NonStringMapKey {
                location: location.to_string(),
                found: key.kind_name(),
            })
        }
        _ => Ok(()),
    })?;

    tracing::debug!(
        types = validated.types.len(),
        methods = validated.methods.len(),
        events = validated.events.len(),
        "manifest passed schema validation"
    );

    Ok(validated)
}
