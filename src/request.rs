//! Request encoding: read-path query parameters and write-path XML documents.

use crate::config::ZohoConfig;
use crate::mapping::NameMapper;
use crate::{Record, API_SCOPE};

/// Ordered query/form parameter list with caller overrides winning on
/// key collision.
#[derive(Debug, Default)]
pub(crate) struct Params(Vec<(String, String)>);

impl Params {
    /// Required authentication parameters every request carries.
    pub(crate) fn auth(config: &ZohoConfig) -> Self {
        Self(vec![
            ("authtoken".to_string(), config.auth_token.clone()),
            ("scope".to_string(), API_SCOPE.to_string()),
            ("newFormat".to_string(), "1".to_string()),
        ])
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Apply caller-supplied overrides; an existing key is replaced in
    /// place, a new key is appended.
    pub(crate) fn apply_overrides(&mut self, overrides: &[(String, String)]) {
        for (key, value) in overrides {
            match self.0.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.clone(),
                None => self.0.push((key.clone(), value.clone())),
            }
        }
    }

    pub(crate) fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Build the write XML document:
/// `<Module><row no="1"><FL val="Field">value</FL>...</row>...</Module>`.
///
/// Rows are numbered from 1 in input order. A record with no fields still
/// yields its row element.
pub(crate) fn write_document(mapper: &NameMapper<'_>, module: &str, records: &[Record]) -> String {
    let root = mapper.resolve_module(module);
    let mut doc = String::new();
    doc.push('<');
    doc.push_str(root);
    doc.push('>');

    for (index, record) in records.iter().enumerate() {
        if record.is_empty() {
            doc.push_str(&format!("<row no=\"{}\"/>", index + 1));
            continue;
        }
        doc.push_str(&format!("<row no=\"{}\">", index + 1));
        for (field, value) in record {
            let wire = mapper.resolve_field(module, field);
            doc.push_str(&format!(
                "<FL val=\"{}\">{}</FL>",
                escape_xml(wire),
                escape_xml(value)
            ));
        }
        doc.push_str("</row>");
    }

    doc.push_str("</");
    doc.push_str(root);
    doc.push('>');
    doc
}

/// Serialize a synchronous search condition: `(Field|operator|value)`.
pub(crate) fn search_condition(
    mapper: &NameMapper<'_>,
    module: &str,
    field: &str,
    operator: &str,
    value: &str,
) -> String {
    format!("({}|{}|{})", mapper.resolve_field(module, field), operator, value)
}

/// Serialize asynchronous search criteria: `((F1:v1),(F2:v2))`.
///
/// Not interchangeable with [`search_condition`]: the two formats go to
/// different endpoints with different consistency guarantees.
pub(crate) fn search_criteria(
    mapper: &NameMapper<'_>,
    module: &str,
    pairs: &[(&str, &str)],
) -> String {
    let inner = pairs
        .iter()
        .map(|(field, value)| format!("({}:{})", mapper.resolve_field(module, field), value))
        .collect::<Vec<_>>()
        .join(",");
    format!("({})", inner)
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
