//! End-to-end tests against a mock Zoho endpoint.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zoho_crm_api::{ConvertLeadOptions, RowOutcome, WriteOptions, ZohoClient, ZohoConfig};

async fn client(server: &MockServer) -> ZohoClient {
    let config = ZohoConfig::builder()
        .auth_token("test-token")
        .base_url(server.uri())
        .module_alias("Things", "CustomModule1")
        .field_alias("Things", "name", "Thing Name")
        .field_alias("Leads", "email", "Email")
        .build()
        .unwrap();
    ZohoClient::new(config).unwrap()
}

fn lead_row(no: usize, email: &str) -> serde_json::Value {
    json!({"no": no.to_string(), "FL": [
        {"val": "LEADID", "content": format!("10{no}")},
        {"val": "Email", "content": email}
    ]})
}

fn insert_success_row(no: usize, id: usize) -> String {
    format!(
        "<row no=\"{no}\"><success><code>2000</code>\
         <details><FL val=\"Id\">{id}</FL></details></success></row>"
    )
}

#[tokio::test]
async fn get_records_returns_caller_facing_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getRecords"))
        .and(query_param("authtoken", "test-token"))
        .and(query_param("scope", "crmapi"))
        .and(query_param("fromIndex", "1"))
        .and(query_param("toIndex", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"Leads": {"row": [
                lead_row(1, "a@example.com"),
                lead_row(2, "b@example.com"),
            ]}}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records = client.get_records("Leads", 1, 20, &[]).await.unwrap().unwrap();

    assert_eq!(records.len(), 2);
    // wire names unresolved to caller-facing aliases, no leakage
    assert!(records[0].contains(&("email".to_string(), "a@example.com".to_string())));
    assert!(records[0].contains(&("LEADID".to_string(), "101".to_string())));
}

#[tokio::test]
async fn get_record_by_id_normalizes_bare_object_row() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getRecordById"))
        .and(query_param("id", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"Leads": {"row":
                {"no": "1", "FL": {"val": "Email", "content": "a@example.com"}}
            }}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let record = client.get_record_by_id("Leads", "101").await.unwrap().unwrap();
    assert_eq!(record, vec![("email".to_string(), "a@example.com".to_string())]);
}

#[tokio::test]
async fn get_records_by_ids_joins_the_idlist() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getRecordById"))
        .and(query_param("idlist", "101;102"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"Leads": {"row": [
                lead_row(1, "a@example.com"),
                lead_row(2, "b@example.com"),
            ]}}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records = client
        .get_records_by_ids("Leads", &["101", "102"])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[1].contains(&("email".to_string(), "b@example.com".to_string())));
}

#[tokio::test]
async fn module_alias_is_resolved_in_the_url_and_result_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/CustomModule1/getRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"CustomModule1": {"row":
                {"no": "1", "FL": {"val": "Thing Name", "content": "Pump"}}
            }}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records = client.get_records("Things", 1, 10, &[]).await.unwrap().unwrap();
    assert_eq!(records[0], vec![("name".to_string(), "Pump".to_string())]);
}

#[tokio::test]
async fn out_of_range_requests_issue_no_http_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server).await;
    assert!(client.get_records("Leads", 100, 50, &[]).await.unwrap().is_none());
    assert!(client.get_records("Leads", -1, 50, &[]).await.unwrap().is_none());
    assert!(client.get_records("Leads", 1, 500, &[]).await.unwrap().is_none());
}

#[tokio::test]
async fn nodata_sentinel_yields_none_and_error_codes_surface() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"nodata": {"code": "4422", "message": "There is no data to show"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json/Leads/getSearchRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"error": {"code": "4600", "message": "Unable to process your request"}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let none = client.get_records("Leads", 1, 20, &[]).await.unwrap();
    assert!(none.is_none());

    let err = client
        .search_records("Leads", "email", "is", "a@b.c")
        .await
        .unwrap_err();
    assert_eq!(err.remote_code(), Some(4600));
}

#[tokio::test]
async fn insert_batch_positions_are_contiguous_across_pages() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    Mock::given(method("POST"))
        .and(path("/xml/Leads/insertRecords"))
        .and(body_string_contains("version=4"))
        .respond_with(move |_: &wiremock::Request| {
            let call = calls_clone.fetch_add(1, Ordering::SeqCst);
            // first page carries 100 rows, the second the remaining 50
            let rows = if call == 0 { 100 } else { 50 };
            let body: String = (1..=rows)
                .map(|no| insert_success_row(no, 1000 + call as usize * 100 + no))
                .collect();
            ResponseTemplate::new(200)
                .set_body_string(format!("<response><result>{body}</result></response>"))
        })
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records: Vec<_> = (0..150)
        .map(|i| vec![("Last Name".to_string(), format!("Lead {i}"))])
        .collect();

    let results = client
        .insert_records("Leads", &records, &WriteOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 150);
    assert_eq!(
        results.keys().copied().collect::<Vec<_>>(),
        (1..=150).collect::<Vec<_>>()
    );
    assert_eq!(results[&101], RowOutcome::Inserted { id: "1101".to_string() });
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn insert_batch_reports_per_row_duplicates_and_failures() {
    let server = MockServer::start().await;

    let body = format!(
        "<response><result>{}{}{}</result></response>",
        insert_success_row(1, 501),
        "<row no=\"2\"><success><code>2002</code><message>Record(s) already exists</message></success></row>",
        "<row no=\"3\"><error><code>4892</code><details>Unable to populate data</details></error></row>",
    );
    Mock::given(method("POST"))
        .and(path("/xml/Leads/insertRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records: Vec<_> = (0..3)
        .map(|i| vec![("Last Name".to_string(), format!("Lead {i}"))])
        .collect();

    let results = client
        .insert_records("Leads", &records, &WriteOptions::default())
        .await
        .unwrap();

    assert_eq!(results[&1], RowOutcome::Inserted { id: "501".to_string() });
    assert_eq!(results[&2], RowOutcome::AlreadyExists);
    assert_eq!(
        results[&3],
        RowOutcome::Failed { code: 4892, message: "Unable to populate data".to_string() }
    );
}

#[tokio::test]
async fn insert_record_raises_duplicate_for_existing_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xml/Leads/insertRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><result>\
             <row no=\"1\"><success><code>2002</code><message>Record(s) already exists</message></success></row>\
             </result></response>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let record = vec![("Email".to_string(), "a@example.com".to_string())];
    let err = client
        .insert_record("Leads", record, &WriteOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn update_record_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xml/Leads/updateRecords"))
        .and(body_string_contains("version=4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><result>\
             <row no=\"1\"><success><code>2001</code>\
             <details><FL val=\"Id\">501</FL></details></success></row>\
             </result></response>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let record = vec![
        ("Id".to_string(), "501".to_string()),
        ("Company".to_string(), "Organics Live".to_string()),
    ];
    client
        .update_record("Leads", record, &WriteOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn update_failure_surfaces_the_row_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xml/Leads/updateRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><result>\
             <row no=\"1\"><error><code>4401</code><details>Id is required</details></error></row>\
             </result></response>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let record = vec![("Company".to_string(), "Organics Live".to_string())];
    let err = client
        .update_record("Leads", record, &WriteOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.remote_code(), Some(4401));
}

#[tokio::test]
async fn delete_record_checks_the_read_error_signal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/deleteRecords"))
        .and(query_param("id", "501"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"code": "5000", "message": "Record Id(s) : 501;Record(s) deleted successfully"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json/Leads/deleteRecords"))
        .and(query_param("id", "999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"error": {"code": "4103", "message": "There is no record with the specified id"}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    client.delete_record("Leads", "501").await.unwrap();
    let err = client.delete_record("Leads", "999").await.unwrap_err();
    assert_eq!(err.remote_code(), Some(4103));
}

#[tokio::test]
async fn search_condition_and_criteria_use_their_own_formats() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getSearchRecords"))
        .and(query_param("searchCondition", "(Email|contains|example)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"Leads": {"row": lead_row(1, "a@example.com")}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json/Leads/searchRecords"))
        .and(query_param("criteria", "((Email:a@example.com))"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"result": {"Leads": {"row": lead_row(1, "a@example.com")}}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let immediate = client
        .search_records("Leads", "email", "contains", "example")
        .await
        .unwrap();
    assert_eq!(immediate.unwrap().len(), 1);

    let lagged = client
        .search_records_async("Leads", &[("email", "a@example.com")])
        .await
        .unwrap();
    assert_eq!(lagged.unwrap().len(), 1);
}

#[tokio::test]
async fn get_users_normalizes_the_single_user_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Users/getUsers"))
        .and(query_param("type", "AllUsers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": {"user": {"id": "1", "content": "Jane Roe", "email": "jane@example.com"}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let users = client.get_users("AllUsers").await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].contains(&("email".to_string(), "jane@example.com".to_string())));
}

#[tokio::test]
async fn convert_lead_returns_created_entity_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xml/Leads/convertLead"))
        .and(body_string_contains("leadId=508"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<success>\
             <Contact param=\"id\">100</Contact>\
             <Account param=\"id\">101</Account>\
             <Potential param=\"id\">102</Potential>\
             </success>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let options = ConvertLeadOptions {
        potential: Some(vec![("Potential Name".to_string(), "Big Deal".to_string())]),
        ..Default::default()
    };
    let created = client.convert_lead("508", &options).await.unwrap();

    assert_eq!(created.get("Contact").map(String::as_str), Some("100"));
    assert_eq!(created.get("Account").map(String::as_str), Some("101"));
    assert_eq!(created.get("Potential").map(String::as_str), Some("102"));
}

#[tokio::test]
async fn http_failure_is_not_misread_as_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/Leads/getRecords"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client.get_records("Leads", 1, 10, &[]).await.unwrap_err();
    assert!(matches!(
        err.kind,
        zoho_crm_api::ErrorKind::Http { status: 500, .. }
    ));
    assert_eq!(err.remote_code(), None);
}
