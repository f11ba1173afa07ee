//! # zoho-crm-api
//!
//! A client library for the Zoho CRM legacy HTTP API.
//!
//! Read operations go through URL-encoded GET requests returning JSON;
//! write operations go through form-encoded POST requests carrying an
//! embedded XML document. The service returns a single object when one
//! record matches and an array when several do; this crate collapses that
//! ambiguity into uniform, insertion-ordered records, translates between
//! caller-facing and wire module/field names, and correlates bulk write
//! results back to 1-based input positions across request pages.
//!
//! ## Security
//!
//! The auth token is redacted in `Debug` output and skipped in tracing
//! spans.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoho_crm_api::{ZohoClient, ZohoConfig, WriteOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zoho_crm_api::Error> {
//!     let config = ZohoConfig::builder()
//!         .auth_token(std::env::var("ZOHO_AUTH_TOKEN").unwrap())
//!         .field_alias("Leads", "email", "Email")
//!         .build()?;
//!     let client = ZohoClient::new(config)?;
//!
//!     // Read a page of leads
//!     if let Some(leads) = client.get_records("Leads", 1, 20, &[]).await? {
//!         for lead in leads {
//!             println!("{:?}", lead);
//!         }
//!     }
//!
//!     // Insert one record
//!     let record = vec![
//!         ("Last Name".to_string(), "Owner".to_string()),
//!         ("Company".to_string(), "Organics Live".to_string()),
//!     ];
//!     let id = client
//!         .insert_record("Leads", record, &WriteOptions::default())
//!         .await?;
//!     println!("created lead {id}");
//!
//!     Ok(())
//! }
//! ```

mod api;
mod bulk;
mod client;
mod config;
mod error;
mod mapping;
mod request;
mod response;

pub use api::{ConvertLeadOptions, DuplicateCheck, WriteOptions, ZohoClient};
pub use bulk::RowOutcome;
pub use client::ZohoHttpClient;
pub use config::{ZohoConfig, ZohoConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use mapping::NameMapper;

/// One record: insertion-ordered caller-facing field/value pairs.
pub type Record = Vec<(String, String)>;

/// Default Zoho CRM API base URL.
pub const DEFAULT_BASE_URL: &str = "https://crm.zoho.com/crm/private";

/// Fixed scope identifier sent with every request.
pub const API_SCOPE: &str = "crmapi";

/// Maximum span of a `getRecords` index range per request.
pub const MAX_READ_SPAN: usize = 200;

/// Maximum rows per `insertRecords`/`updateRecords` request.
pub const MAX_WRITE_ROWS: usize = 100;

/// Sentinel code: valid query, no matching data. Not an error.
pub const CODE_NO_MATCHING_RECORD: i32 = 4422;

/// Success code for an inserted row.
pub const CODE_INSERT_SUCCESS: i32 = 2000;

/// Success code for an updated row.
pub const CODE_UPDATE_SUCCESS: i32 = 2001;

/// Success-path code denoting a pre-existing record.
pub const CODE_RECORD_EXISTS: i32 = 2002;

/// Message Zoho attaches to the duplicate-detection outcome.
pub const DUPLICATE_MESSAGE: &str = "Record(s) already exists";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("zoho-crm-api/", env!("CARGO_PKG_VERSION"));
