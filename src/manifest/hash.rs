//! Structural manifest fingerprints.
//!
//! A [`ManifestHash`] is a SHA-256 digest over the frozen manifest. Every node
//! is fed to the hasher behind a kind tag; strings and sequences are length
//! prefixed. Generated files carry the hash in their header.

use std::fmt;

use sha2::{Digest, Sha256};

use super::types::{Field, Method, Primitive, TypeDef, TypeRef};
use super::Manifest;

// Node tags
const TAG_REF: u8 = 0x01;
const TAG_PRIMITIVE: u8 = 0x02;
const TAG_LIST: u8 = 0x10;
const TAG_MAP: u8 = 0x11;
const TAG_RECORD: u8 = 0x12;
const TAG_VARIANT: u8 = 0x13;
const TAG_BYTES: u8 = 0x14;
const TAG_METHOD: u8 = 0x20;
const TAG_EVENT: u8 = 0x21;
const TAG_MANIFEST: u8 = 0x30;

/// A 256-bit manifest digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestHash([u8; 32]);

impl ManifestHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Format as hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Format as short hex (first 8 chars).
    pub fn to_short_hex(&self) -> String {
        self.0.iter().take(4).map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ManifestHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

struct ManifestHasher {
    hasher: Sha256,
}

impl ManifestHasher {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn tag(&mut self, tag: u8) {
        self.hasher.update([tag]);
    }

    fn flag(&mut self, value: bool) {
        self.hasher.update([value as u8]);
    }

    fn count(&mut self, n: usize) {
        self.hasher.update((n as u64).to_le_bytes());
    }

    fn string(&mut self, s: &str) {
        self.count(s.len());
        self.hasher.update(s.as_bytes());
    }

    fn optional(&mut self, ty: Option<&TypeRef>) {
        match ty {
            Some(ty) => {
                self.flag(true);
                self.type_ref(ty);
            }
            None => self.flag(false),
        }
    }

    fn fields(&mut self, fields: &[Field]) {
        self.count(fields.len());
        for field in fields {
            self.string(field.name());
            self.flag(field.nullable());
            self.type_ref(field.ty());
        }
    }

    fn type_ref(&mut self, ty: &TypeRef) {
        match ty {
            TypeRef::Named(name) => {
                self.tag(TAG_REF);
                self.string(name);
            }
            TypeRef::Primitive(primitive) => {
                self.tag(TAG_PRIMITIVE);
                self.tag(primitive_tag(*primitive));
            }
            TypeRef::List(items) => {
                self.tag(TAG_LIST);
                self.type_ref(items);
            }
            TypeRef::Map { key, value } => {
                self.tag(TAG_MAP);
                self.type_ref(key);
                self.type_ref(value);
            }
            TypeRef::Record(fields) => {
                self.tag(TAG_RECORD);
                self.fields(fields);
            }
        }
    }

    fn type_def(&mut self, name: &str, def: &TypeDef) {
        match def {
            TypeDef::Record(fields) => {
                self.tag(TAG_RECORD);
                self.string(name);
                self.fields(fields);
            }
            TypeDef::Variant(variants) => {
                self.tag(TAG_VARIANT);
                self.string(name);
                self.count(variants.len());
                for variant in variants {
                    self.string(variant.name());
                    self.optional(variant.payload());
                }
            }
            TypeDef::Bytes { size } => {
                self.tag(TAG_BYTES);
                self.string(name);
                self.hasher
                    .update(size.map_or(0, |size| size.get()).to_le_bytes());
            }
        }
    }

    fn method(&mut self, method: &Method) {
        self.tag(TAG_METHOD);
        self.string(method.name());
        self.fields(method.params());
        self.optional(method.returns());
        self.flag(method.returns_nullable());
        self.count(method.errors().len());
        for case in method.errors() {
            self.string(case.code());
            self.optional(case.payload());
        }
    }

    fn finish(self) -> ManifestHash {
        ManifestHash(self.hasher.finalize().into())
    }
}

fn primitive_tag(primitive: Primitive) -> u8 {
    match primitive {
        Primitive::Bool => 0x01,
        Primitive::I32 => 0x02,
        Primitive::I64 => 0x03,
        Primitive::U32 => 0x04,
        Primitive::U64 => 0x05,
        Primitive::F32 => 0x06,
        Primitive::F64 => 0x07,
        Primitive::String => 0x08,
        Primitive::Unit => 0x09,
        Primitive::Bytes => 0x0a,
    }
}

/// Compute the structural hash of a manifest.
pub fn hash_manifest(manifest: &Manifest) -> ManifestHash {
    let mut hasher = ManifestHasher::new();
    hasher.tag(TAG_MANIFEST);

    hasher.count(manifest.types().len());
    for (name, def) in manifest.types() {
        hasher.type_def(name, def);
    }

    hasher.count(manifest.methods().len());
    for method in manifest.methods() {
        hasher.method(method);
    }

    hasher.count(manifest.events().len());
    for event in manifest.events() {
        hasher.tag(TAG_EVENT);
        hasher.string(event.name());
        hasher.optional(event.payload());
    }

    hasher.finish()
}
