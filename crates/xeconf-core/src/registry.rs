// ── Resource-kind registry ──
//
// An explicit registry object constructed once by the caller and passed by
// reference -- no global provider singletons. Registration validates each
// kind's table so that a malformed field table is a startup error, not a
// runtime surprise mid-reconcile.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::mapper::ResourceKind;
use crate::projection::{FieldKind, ScalarType};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("resource kind '{kind}' is already registered")]
    DuplicateKind { kind: String },

    #[error("resource kind '{kind}' has no identity fields")]
    EmptyIdentity { kind: String },

    #[error("resource kind '{kind}' has no write stages")]
    EmptyStages { kind: String },

    #[error("resource kind '{kind}': stage '{stage}' declares field '{field}' twice")]
    DuplicateField {
        kind: String,
        stage: String,
        field: String,
    },

    #[error("resource kind '{kind}': stage '{stage}' path references '{{{placeholder}}}' which is not an identity field")]
    UnknownPlaceholder {
        kind: String,
        stage: String,
        placeholder: String,
    },

    #[error("resource kind '{kind}': identity field '{field}' must be a plain string or int scalar")]
    NonScalarIdentity { kind: String, field: String },
}

/// Holds the immutable resource-kind tables for one device family.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    kinds: HashMap<String, Arc<ResourceKind>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a resource kind.
    pub fn register(&mut self, kind: ResourceKind) -> Result<(), RegistryError> {
        validate(&kind)?;
        if self.kinds.contains_key(kind.name()) {
            return Err(RegistryError::DuplicateKind {
                kind: kind.name().to_owned(),
            });
        }
        self.kinds.insert(kind.name().to_owned(), Arc::new(kind));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<ResourceKind>> {
        self.kinds.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Registered kind names, sorted for stable iteration.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn validate(kind: &ResourceKind) -> Result<(), RegistryError> {
    let name = kind.name().to_owned();

    if kind.identity_fields().is_empty() {
        return Err(RegistryError::EmptyIdentity { kind: name });
    }
    if kind.stages().is_empty() {
        return Err(RegistryError::EmptyStages { kind: name });
    }

    let identity: HashSet<&str> = kind.identity_fields().iter().map(String::as_str).collect();

    for stage in kind.stages() {
        let mut seen = HashSet::new();
        for field in stage.fields() {
            if !seen.insert(field.declared_name()) {
                return Err(RegistryError::DuplicateField {
                    kind: name,
                    stage: stage.name().to_owned(),
                    field: field.declared_name().to_owned(),
                });
            }
            // Identity fields must be representable as RESTCONF list keys.
            if identity.contains(field.declared_name())
                && !matches!(
                    field.kind(),
                    FieldKind::Scalar(ScalarType::Str | ScalarType::Int)
                )
            {
                return Err(RegistryError::NonScalarIdentity {
                    kind: name,
                    field: field.declared_name().to_owned(),
                });
            }
        }

        for placeholder in stage.path().placeholders() {
            if !identity.contains(placeholder) {
                return Err(RegistryError::UnknownPlaceholder {
                    kind: name,
                    stage: stage.name().to_owned(),
                    placeholder: placeholder.to_owned(),
                });
            }
        }
    }

    Ok(())
}
