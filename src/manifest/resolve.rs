//! Named type reference resolution.
//!
//! Every `$ref` must name an entry of the type table. Cycles between named
//! types are fine: resolution is a membership check, never an expansion.

use thiserror::Error;

use super::types::TypeRef;
use super::validation::Validated;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Dangling $ref {name:?} at {location}")]
    Dangling { name: String, location: String },
}

/// Check every reachable `$ref`. Returns the number of references checked.
pub(crate) fn resolve_references(manifest: &Validated) -> Result<usize, ResolveError> {
    let mut checked = 0;
    manifest.visit_type_refs(&mut |node, location| {
        if let TypeRef::Named(name) = node {
            if !manifest.types.contains_key(name) {
                return Err(ResolveError::Dangling {
                    name: name.clone(),
                    location: location.to_string(),
                });
            }
            checked += 1;
        }
        Ok(())
    })?;

    tracing::debug!(references = checked, "resolved named type references");
    Ok(checked)
}
