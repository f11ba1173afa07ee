//! Bulk write-row classification and position correlation.
//!
//! Insert and update responses carry one `<row no="N">` block per input
//! row, numbered within the request. Pages are issued sequentially; the
//! accumulating stride (`page_index * page_size`) turns in-page numbers
//! into globally 1-based, contiguous positions across the whole batch.

use std::collections::BTreeMap;

use crate::error::{Error, ErrorKind, Result, UNKNOWN_CODE, UNSPECIFIED_MESSAGE};
use crate::response::{check_write_error, extract_element, extract_fl, parse_code, row_blocks};
use crate::{CODE_RECORD_EXISTS, CODE_UPDATE_SUCCESS};

/// Outcome of a single row in a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row was inserted; carries the identifier Zoho assigned.
    Inserted { id: String },
    /// Insert skipped: this exact record already exists.
    AlreadyExists,
    /// The row was updated.
    Updated,
    /// Zoho rejected the row.
    Failed { code: i32, message: String },
}

impl RowOutcome {
    /// Returns true for `Inserted` and `Updated`.
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Inserted { .. } | RowOutcome::Updated)
    }

    /// Convert a non-success outcome into the failure it represents.
    pub fn into_error(self) -> Option<Error> {
        match self {
            RowOutcome::Inserted { .. } | RowOutcome::Updated => None,
            RowOutcome::AlreadyExists => Some(Error::new(ErrorKind::DuplicateRecord)),
            RowOutcome::Failed { code, message } => Some(Error::remote(code, message)),
        }
    }
}

/// Which write operation a response belongs to; the success signals differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Insert,
    Update,
}

/// Classify one page's response rows into `out`, keyed by global position.
///
/// `page_len` is the number of rows sent in this page, used for the
/// rowless single-record response shape.
pub(crate) fn classify_rows(
    xml: &str,
    kind: WriteKind,
    stride: usize,
    page_len: usize,
    out: &mut BTreeMap<usize, RowOutcome>,
) -> Result<()> {
    let blocks = row_blocks(xml);

    if blocks.is_empty() {
        // Old-format response: no per-row blocks. A top-level error or
        // duplicate still applies to the whole (single-row) request.
        check_write_error(xml)?;
        if page_len == 1 {
            let outcome = match kind {
                WriteKind::Insert => RowOutcome::Inserted {
                    id: extract_fl(xml, "Id").unwrap_or_default(),
                },
                WriteKind::Update => RowOutcome::Updated,
            };
            out.insert(stride + 1, outcome);
            return Ok(());
        }
        return Err(Error::new(ErrorKind::InvalidResponse(
            "write response carried no result rows".to_string(),
        )));
    }

    for (no, block) in blocks {
        out.insert(stride + no, classify_row(block, kind));
    }
    Ok(())
}

fn classify_row(block: &str, kind: WriteKind) -> RowOutcome {
    if block.contains("<error>") {
        let code = extract_element(block, "code")
            .map(|c| parse_code(&c))
            .unwrap_or(UNKNOWN_CODE);
        let message = extract_element(block, "message")
            .or_else(|| extract_element(block, "details"))
            .unwrap_or_else(|| UNSPECIFIED_MESSAGE.to_string());
        return RowOutcome::Failed { code, message };
    }

    let code = extract_element(block, "code")
        .map(|c| parse_code(&c))
        .unwrap_or(UNKNOWN_CODE);

    match kind {
        WriteKind::Insert if code == CODE_RECORD_EXISTS => RowOutcome::AlreadyExists,
        WriteKind::Insert => RowOutcome::Inserted {
            id: extract_fl(block, "Id").unwrap_or_default(),
        },
        WriteKind::Update if code == CODE_UPDATE_SUCCESS => RowOutcome::Updated,
        // Absence of the update success code is an error row.
        WriteKind::Update => RowOutcome::Failed {
            code,
            message: extract_element(block, "message")
                .unwrap_or_else(|| UNSPECIFIED_MESSAGE.to_string()),
        },
    }
}
