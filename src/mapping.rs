//! Bidirectional translation between caller-facing and wire names.
//!
//! Caller-visible module/field names and wire names are distinct
//! namespaces connected only through the alias tables in
//! [`crate::ZohoConfig`]. Absence of a mapping is never a failure: an
//! unmapped name passes through unchanged in either direction.

use std::collections::HashMap;

use crate::config::ZohoConfig;

/// Read-only view over the configured name-alias tables.
#[derive(Debug, Clone, Copy)]
pub struct NameMapper<'a> {
    modules: &'a HashMap<String, String>,
    fields: &'a HashMap<String, HashMap<String, String>>,
}

impl<'a> NameMapper<'a> {
    /// Create a mapper over the given configuration.
    pub fn new(config: &'a ZohoConfig) -> Self {
        Self {
            modules: &config.module_aliases,
            fields: &config.field_aliases,
        }
    }

    /// Translate a caller-facing module name to its wire name.
    pub fn resolve_module<'s>(&'s self, name: &'s str) -> &'s str {
        self.modules.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Translate a caller-facing field name to its wire name.
    ///
    /// A previously-unseen module behaves as an empty table.
    pub fn resolve_field<'s>(&'s self, module: &str, field: &'s str) -> &'s str {
        self.fields
            .get(module)
            .and_then(|m| m.get(field))
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Translate a wire field name back to its caller-facing name.
    ///
    /// Wire names that are not a mapped value are treated as already
    /// caller-facing and returned unchanged.
    pub fn unresolve_field<'s>(&'s self, module: &str, internal: &'s str) -> &'s str {
        self.fields
            .get(module)
            .and_then(|m| m.iter().find(|(_, wire)| wire.as_str() == internal))
            .map(|(caller, _)| caller.as_str())
            .unwrap_or(internal)
    }
}
