//! High-level Zoho CRM operations.
//!
//! Every operation reads the configuration handed to [`ZohoClient::new`],
//! resolves names through the mapper, issues its HTTP round trips strictly
//! in sequence, and classifies the response before returning. Remote
//! errors surface with their original code and message; the
//! no-matching-record sentinel surfaces as `Ok(None)`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::bulk::{classify_rows, RowOutcome, WriteKind};
use crate::client::ZohoHttpClient;
use crate::config::ZohoConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::mapping::NameMapper;
use crate::request::{escape_xml, search_condition, search_criteria, write_document, Params};
use crate::response::{check_read_error, check_write_error, extract_records, extract_users};
use crate::{Record, MAX_READ_SPAN, MAX_WRITE_ROWS};

/// Options for insert/update operations.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Fire the module's workflow rules for the written records.
    pub workflow_trigger: bool,
    /// How Zoho should handle rows that match an existing record.
    pub duplicate_check: Option<DuplicateCheck>,
}

/// Duplicate handling mode for inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// Report the duplicate and leave the existing record untouched.
    Skip,
    /// Merge the incoming values into the existing record.
    Merge,
}

impl DuplicateCheck {
    fn as_param(self) -> &'static str {
        match self {
            DuplicateCheck::Skip => "1",
            DuplicateCheck::Merge => "2",
        }
    }
}

/// Options for lead conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertLeadOptions {
    /// Create a potential from the lead; field/value pairs for it
    /// (e.g. "Potential Name", "Closing Date", "Potential Stage").
    pub potential: Option<Record>,
    /// User (email) the converted records are assigned to.
    pub assign_to: Option<String>,
    /// Notify the lead owner of the conversion.
    pub notify_lead_owner: bool,
    /// Notify the owner of the newly created records.
    pub notify_new_entity_owner: bool,
}

/// Zoho CRM client.
///
/// # Example
///
/// ```rust,ignore
/// use zoho_crm_api::{ZohoClient, ZohoConfig};
///
/// let config = ZohoConfig::new("auth-token")?;
/// let client = ZohoClient::new(config)?;
/// let lead = client.get_record_by_id("Leads", "508020000000671023").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ZohoClient {
    http: ZohoHttpClient,
    config: ZohoConfig,
}

impl ZohoClient {
    /// Create a client from the given configuration.
    pub fn new(config: ZohoConfig) -> Result<Self> {
        let http = ZohoHttpClient::new(&config)?;
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ZohoConfig {
        &self.config
    }

    fn mapper(&self) -> NameMapper<'_> {
        NameMapper::new(&self.config)
    }

    fn read_url(&self, wire_module: &str, operation: &str) -> String {
        format!("{}/json/{}/{}", self.config.base_url, wire_module, operation)
    }

    fn write_url(&self, wire_module: &str, operation: &str) -> String {
        format!("{}/xml/{}/{}", self.config.base_url, wire_module, operation)
    }

    async fn read(&self, wire_module: &str, operation: &str, params: &Params) -> Result<Value> {
        let url = self.read_url(wire_module, operation);
        let body = self.http.get(&url, params.as_slice()).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    /// Fetch a single record by its identifier.
    #[instrument(skip(self))]
    pub async fn get_record_by_id(&self, module: &str, id: &str) -> Result<Option<Record>> {
        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("id", id);

        let body = self.read(mapper.resolve_module(module), "getRecordById", &params).await?;
        let records = extract_records(&mapper, module, &body)?;
        Ok(records.and_then(|mut rows| {
            if rows.is_empty() {
                None
            } else {
                Some(rows.remove(0))
            }
        }))
    }

    /// Fetch several records by identifier in one call.
    #[instrument(skip(self))]
    pub async fn get_records_by_ids(
        &self,
        module: &str,
        ids: &[&str],
    ) -> Result<Option<Vec<Record>>> {
        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("idlist", ids.join(";"));

        let body = self.read(mapper.resolve_module(module), "getRecordById", &params).await?;
        extract_records(&mapper, module, &body)
    }

    /// Fetch a 1-based index range of records.
    ///
    /// Out-of-range requests are rejected locally, before any HTTP call:
    /// a lower bound under 1, an inverted range, or a span over the remote
    /// page maximum all return the no-result value.
    #[instrument(skip(self, overrides))]
    pub async fn get_records(
        &self,
        module: &str,
        from: i64,
        to: i64,
        overrides: &[(String, String)],
    ) -> Result<Option<Vec<Record>>> {
        if from < 1 || from > to || (to - from + 1) as usize > MAX_READ_SPAN {
            debug!(from, to, "index range rejected locally");
            return Ok(None);
        }

        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("selectColumns", "All");
        params.push("fromIndex", from.to_string());
        params.push("toIndex", to.to_string());
        params.apply_overrides(overrides);

        let body = self.read(mapper.resolve_module(module), "getRecords", &params).await?;
        extract_records(&mapper, module, &body)
    }

    /// Synchronous search: `(field|operator|value)` condition.
    ///
    /// Reflects writes immediately and counts against the API rate budget.
    #[instrument(skip(self))]
    pub async fn search_records(
        &self,
        module: &str,
        field: &str,
        operator: &str,
        value: &str,
    ) -> Result<Option<Vec<Record>>> {
        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("selectColumns", "All");
        params.push("searchCondition", search_condition(&mapper, module, field, operator, value));

        let body = self
            .read(mapper.resolve_module(module), "getSearchRecords", &params)
            .await?;
        extract_records(&mapper, module, &body)
    }

    /// Asynchronous (predefined-columns) search: `((field:value),...)`
    /// criteria.
    ///
    /// Does not count against the rate budget, but may lag writes by one
    /// to two minutes; callers needing read-your-writes should use
    /// [`Self::search_records`].
    #[instrument(skip(self))]
    pub async fn search_records_async(
        &self,
        module: &str,
        pairs: &[(&str, &str)],
    ) -> Result<Option<Vec<Record>>> {
        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("selectColumns", "All");
        params.push("criteria", search_criteria(&mapper, module, pairs));

        let body = self.read(mapper.resolve_module(module), "searchRecords", &params).await?;
        extract_records(&mapper, module, &body)
    }

    /// Fetch CRM users, e.g. `kind = "AllUsers"` or `"ActiveUsers"`.
    #[instrument(skip(self))]
    pub async fn get_users(&self, kind: &str) -> Result<Vec<Record>> {
        let mut params = Params::auth(&self.config);
        params.push("type", kind);

        let body = self.read("Users", "getUsers", &params).await?;
        extract_users(&body)
    }

    // =========================================================================
    // Write operations
    // =========================================================================

    /// Insert a batch of records, paging as the remote maximum requires.
    ///
    /// The result maps each 1-based input position to its outcome;
    /// positions are contiguous across pages. Per-row failures do not
    /// abort the batch.
    #[instrument(skip(self, records, options))]
    pub async fn insert_records(
        &self,
        module: &str,
        records: &[Record],
        options: &WriteOptions,
    ) -> Result<BTreeMap<usize, RowOutcome>> {
        self.write_batch(module, "insertRecords", WriteKind::Insert, records, options)
            .await
    }

    /// Update a batch of records; each record must carry its `Id` field.
    #[instrument(skip(self, records, options))]
    pub async fn update_records(
        &self,
        module: &str,
        records: &[Record],
        options: &WriteOptions,
    ) -> Result<BTreeMap<usize, RowOutcome>> {
        self.write_batch(module, "updateRecords", WriteKind::Update, records, options)
            .await
    }

    async fn write_batch(
        &self,
        module: &str,
        operation: &str,
        kind: WriteKind,
        records: &[Record],
        options: &WriteOptions,
    ) -> Result<BTreeMap<usize, RowOutcome>> {
        let mapper = self.mapper();
        let wire_module = mapper.resolve_module(module).to_string();
        let url = self.write_url(&wire_module, operation);

        let mut results = BTreeMap::new();
        // Pages go out one at a time: position accounting depends on a
        // page completing before the next starts.
        for (page_index, page) in records.chunks(MAX_WRITE_ROWS).enumerate() {
            debug!(page_index, rows = page.len(), "writing page");
            let mut form = Params::auth(&self.config);
            form.push("version", "4");
            form.push(
                "wfTrigger",
                if options.workflow_trigger { "true" } else { "false" },
            );
            if let Some(mode) = options.duplicate_check {
                form.push("duplicateCheck", mode.as_param());
            }
            form.push("xmlData", write_document(&mapper, module, page));

            let body = self.http.post_form(&url, form.as_slice()).await?;
            classify_rows(
                &body,
                kind,
                page_index * MAX_WRITE_ROWS,
                page.len(),
                &mut results,
            )?;
        }
        Ok(results)
    }

    /// Insert one record and return the identifier Zoho assigned.
    ///
    /// A duplicate surfaces as [`ErrorKind::DuplicateRecord`], every other
    /// rejection as [`ErrorKind::Remote`].
    #[instrument(skip(self, record, options))]
    pub async fn insert_record(
        &self,
        module: &str,
        record: Record,
        options: &WriteOptions,
    ) -> Result<String> {
        let mut results = self
            .insert_records(module, std::slice::from_ref(&record), options)
            .await?;
        match Self::sole_outcome(&mut results)? {
            RowOutcome::Inserted { id } => Ok(id),
            other => Err(other.into_error().unwrap_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "unexpected outcome for insert".to_string(),
                ))
            })),
        }
    }

    /// Update one record; it must carry its `Id` field.
    #[instrument(skip(self, record, options))]
    pub async fn update_record(
        &self,
        module: &str,
        record: Record,
        options: &WriteOptions,
    ) -> Result<()> {
        let mut results = self
            .update_records(module, std::slice::from_ref(&record), options)
            .await?;
        match Self::sole_outcome(&mut results)? {
            RowOutcome::Updated => Ok(()),
            other => Err(other.into_error().unwrap_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "unexpected outcome for update".to_string(),
                ))
            })),
        }
    }

    fn sole_outcome(results: &mut BTreeMap<usize, RowOutcome>) -> Result<RowOutcome> {
        results.remove(&1).ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(
                "write response carried no row 1".to_string(),
            ))
        })
    }

    /// Delete a record by its identifier.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, module: &str, id: &str) -> Result<()> {
        let mapper = self.mapper();
        let mut params = Params::auth(&self.config);
        params.push("id", id);

        let body = self.read(mapper.resolve_module(module), "deleteRecords", &params).await?;
        check_read_error(&body)?;
        Ok(())
    }

    /// Convert a lead into contact/account (and optionally a potential).
    ///
    /// Returns the created entities keyed by kind ("Contact", "Account",
    /// "Potential") with the identifier assigned to each.
    #[instrument(skip(self, options))]
    pub async fn convert_lead(
        &self,
        lead_id: &str,
        options: &ConvertLeadOptions,
    ) -> Result<BTreeMap<String, String>> {
        let mut form = Params::auth(&self.config);
        form.push("leadId", lead_id);
        form.push("xmlData", convert_document(options));

        let url = self.write_url("Leads", "convertLead");
        let body = self.http.post_form(&url, form.as_slice()).await?;
        check_write_error(&body)?;

        let mut created = BTreeMap::new();
        for entity in ["Contact", "Account", "Potential"] {
            if let Some(id) = extract_param_id(&body, entity) {
                created.insert(entity.to_string(), id);
            }
        }
        if created.is_empty() {
            return Err(Error::new(ErrorKind::InvalidResponse(
                "conversion response carried no created entities".to_string(),
            )));
        }
        Ok(created)
    }
}

/// Build the `convertLead` option document: row 1 carries the conversion
/// options, row 2 (when a potential is requested) its field values.
fn convert_document(options: &ConvertLeadOptions) -> String {
    let mut doc = String::from("<Potentials><row no=\"1\">");
    push_option(
        &mut doc,
        "createPotential",
        if options.potential.is_some() { "true" } else { "false" },
    );
    if let Some(assign_to) = &options.assign_to {
        push_option(&mut doc, "assignTo", assign_to);
    }
    push_option(
        &mut doc,
        "notifyLeadOwner",
        if options.notify_lead_owner { "true" } else { "false" },
    );
    push_option(
        &mut doc,
        "notifyNewEntityOwner",
        if options.notify_new_entity_owner { "true" } else { "false" },
    );
    doc.push_str("</row>");

    if let Some(potential) = &options.potential {
        doc.push_str("<row no=\"2\">");
        for (field, value) in potential {
            doc.push_str(&format!(
                "<FL val=\"{}\">{}</FL>",
                escape_xml(field),
                escape_xml(value)
            ));
        }
        doc.push_str("</row>");
    }

    doc.push_str("</Potentials>");
    doc
}

fn push_option(doc: &mut String, name: &str, value: &str) {
    doc.push_str(&format!(
        "<option val=\"{}\">{}</option>",
        name,
        escape_xml(value)
    ));
}

/// Extract the id from `<Entity param="id">...</Entity>`.
fn extract_param_id(xml: &str, entity: &str) -> Option<String> {
    let start_tag = format!("<{} param=\"id\">", entity);
    let end_tag = format!("</{}>", entity);
    let start = xml.find(&start_tag)? + start_tag.len();
    let end = xml[start..].find(&end_tag)? + start;
    Some(xml[start..end].to_string())
}
