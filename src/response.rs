//! Response normalization and error classification.
//!
//! Zoho's JSON serializer collapses one-element arrays to bare objects,
//! both for the record set and for each record's field list. Everything
//! in this module funnels through [`as_sequence`] before touching a row,
//! so single and multi shapes are observably equivalent downstream.
//!
//! The error signal differs between the two response kinds: read (JSON)
//! responses carry an `error` key on the top-level `response` object,
//! write (XML) responses carry an `error` element somewhere under the
//! result root. Both converge on the same failure construction with a
//! best-effort code (−1 when absent) and message.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result, UNKNOWN_CODE, UNSPECIFIED_MESSAGE};
use crate::mapping::NameMapper;
use crate::{Record, CODE_NO_MATCHING_RECORD, CODE_RECORD_EXISTS, DUPLICATE_MESSAGE};

// =========================================================================
// JSON (read path)
// =========================================================================

/// Collapse the single-vs-array ambiguity into an ordered sequence.
///
/// A bare object becomes a one-element sequence; an array passes through;
/// anything else is empty.
pub(crate) fn as_sequence(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Zoho sends codes as strings in JSON and as element text in XML.
fn code_from_value(value: &Value) -> i32 {
    match value {
        Value::String(s) => s.trim().parse().unwrap_or(UNKNOWN_CODE),
        Value::Number(n) => n.as_i64().map(|n| n as i32).unwrap_or(UNKNOWN_CODE),
        _ => UNKNOWN_CODE,
    }
}

fn remote_from_value(err: &Value) -> Error {
    let code = err.get("code").map(code_from_value).unwrap_or(UNKNOWN_CODE);
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(UNSPECIFIED_MESSAGE)
        .to_string();
    Error::remote(code, message)
}

/// Fail if a read response carries the top-level error signal.
pub(crate) fn check_read_error(body: &Value) -> Result<()> {
    if let Some(err) = body.get("response").and_then(|r| r.get("error")) {
        return Err(remote_from_value(err));
    }
    Ok(())
}

/// Extract the record rows for a module from a read response.
///
/// Returns `Ok(None)` on the no-matching-record sentinel: that is a valid
/// outcome, not an error. Every field key in the returned records is
/// caller-facing (wire names are unresolved through the mapper).
pub(crate) fn extract_records(
    mapper: &NameMapper<'_>,
    module: &str,
    body: &Value,
) -> Result<Option<Vec<Record>>> {
    let response = body.get("response").unwrap_or(body);

    if let Some(nodata) = response.get("nodata") {
        let code = nodata.get("code").map(code_from_value).unwrap_or(UNKNOWN_CODE);
        if code == CODE_NO_MATCHING_RECORD {
            return Ok(None);
        }
        // Only the documented sentinel is guaranteed non-error.
        return Err(remote_from_value(nodata));
    }
    if let Some(err) = response.get("error") {
        return Err(remote_from_value(err));
    }

    let wire_module = mapper.resolve_module(module);
    let rows = response
        .get("result")
        .and_then(|r| r.get(wire_module))
        .and_then(|m| m.get("row"))
        .ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(format!(
                "missing result payload for {wire_module}"
            )))
        })?;

    let mut records = Vec::new();
    for row in as_sequence(rows) {
        let mut record = Record::new();
        let fields = row.get("FL").map(as_sequence).unwrap_or_default();
        for field in fields {
            let Some(wire_name) = field.get("val").and_then(Value::as_str) else {
                continue;
            };
            let content = field.get("content").map(scalar_to_string).unwrap_or_default();
            record.push((mapper.unresolve_field(module, wire_name).to_string(), content));
        }
        records.push(record);
    }
    Ok(Some(records))
}

/// Extract the user list from a `getUsers` response.
pub(crate) fn extract_users(body: &Value) -> Result<Vec<Record>> {
    check_read_error(body)?;

    let users = body
        .get("users")
        .and_then(|u| u.get("user"))
        .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("missing user payload".to_string())))?;

    let mut records = Vec::new();
    for user in as_sequence(users) {
        let Some(object) = user.as_object() else {
            continue;
        };
        let record = object
            .iter()
            .map(|(key, value)| (key.clone(), scalar_to_string(value)))
            .collect();
        records.push(record);
    }
    Ok(records)
}

// =========================================================================
// XML (write path)
// =========================================================================

/// Extract the text content of the first `<tag>...</tag>` occurrence.
pub(crate) fn extract_element(xml: &str, tag: &str) -> Option<String> {
    Some(tag_block(xml, tag)?.to_string())
}

fn tag_block<'x>(xml: &'x str, tag: &str) -> Option<&'x str> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);
    let start = xml.find(&start_tag)? + start_tag.len();
    let end = xml[start..].find(&end_tag)? + start;
    Some(&xml[start..end])
}

/// Extract the content of `<FL val="name">...</FL>`.
pub(crate) fn extract_fl(xml: &str, name: &str) -> Option<String> {
    let start_tag = format!("<FL val=\"{}\">", name);
    let start = xml.find(&start_tag)? + start_tag.len();
    let end = xml[start..].find("</FL>")? + start;
    Some(xml[start..end].to_string())
}

/// Split a write response into its `<row no="N">` blocks.
pub(crate) fn row_blocks(xml: &str) -> Vec<(usize, &str)> {
    let mut blocks = Vec::new();
    let mut search_from = xml;

    while let Some(start) = search_from.find("<row no=\"") {
        let after_attr = &search_from[start + "<row no=\"".len()..];
        let Some(quote) = after_attr.find('"') else { break };
        let Ok(no) = after_attr[..quote].parse::<usize>() else { break };

        let Some(open_end) = after_attr.find('>') else { break };
        let body = &after_attr[open_end + 1..];
        let Some(close) = body.find("</row>") else { break };

        blocks.push((no, &body[..close]));
        search_from = &body[close + "</row>".len()..];
    }
    blocks
}

pub(crate) fn parse_code(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(UNKNOWN_CODE)
}

/// Fail if a write response carries an error element or the known
/// duplicate-detection success message.
pub(crate) fn check_write_error(xml: &str) -> Result<()> {
    if let Some(block) = tag_block(xml, "error") {
        let code = extract_element(block, "code")
            .map(|c| parse_code(&c))
            .unwrap_or(UNKNOWN_CODE);
        let message = extract_element(block, "message")
            .or_else(|| extract_element(block, "details"))
            .unwrap_or_else(|| UNSPECIFIED_MESSAGE.to_string());

        if code == CODE_RECORD_EXISTS || message == DUPLICATE_MESSAGE {
            return Err(Error::new(ErrorKind::DuplicateRecord));
        }
        return Err(Error::remote(code, message));
    }

    if extract_element(xml, "message").as_deref() == Some(DUPLICATE_MESSAGE) {
        return Err(Error::new(ErrorKind::DuplicateRecord));
    }
    Ok(())
}
