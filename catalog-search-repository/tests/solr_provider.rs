//! Integration tests for the Solr provider.
//!
//! These tests run the real provider against a mock HTTP server.

use catalog_search_repository::{
    IndexHandle, QueryHandle, SchemaLocation, SchemaProvider, SearchError, SolrProvider,
    SolrSettings,
};
use catalog_search_shared::{EntityType, IndexedRecord};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> SolrSettings {
    SolrSettings::new(format!("{}/solr/ckan", server.uri())).with_site_id("test-site")
}

fn provider(settings: SolrSettings) -> SolrProvider {
    SolrProvider::new(settings, EntityType::package()).unwrap()
}

fn record(id: &str, name: &str) -> IndexedRecord {
    IndexedRecord::id_only(id).with("name", name)
}

#[tokio::test]
async fn insert_posts_scoped_document_and_commits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/ckan/update"))
        .and(query_param("commit", "true"))
        .and(body_json(json!([{
            "id": "abc",
            "name": "rainfall",
            "index_id": "test-site:package:abc",
            "site_id": "test-site",
            "entity_type": "package"
        }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provider(settings(&server))
        .insert(&record("abc", "rainfall"))
        .await
        .unwrap();
}

#[tokio::test]
async fn deferred_update_does_not_commit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/ckan/update"))
        .and(query_param_is_missing("commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provider(settings(&server))
        .update(&record("abc", "rainfall"), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_deletes_by_id_or_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/ckan/update"))
        .and(body_json(json!({
            "delete": {
                "query": "+site_id:\"test-site\" +entity_type:\"package\" +(id:\"abc\" OR name:\"abc\")"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provider(settings(&server))
        .remove(&IndexedRecord::id_only("abc"))
        .await
        .unwrap();
}

#[tokio::test]
async fn clear_deletes_whole_site() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/ckan/update"))
        .and(body_json(json!({ "delete": { "query": "+site_id:\"test-site\"" } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provider(settings(&server)).clear().await.unwrap();
}

#[tokio::test]
async fn rejected_write_is_an_index_write_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/ckan/update"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = provider(settings(&server))
        .insert(&record("abc", "rainfall"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::IndexWriteError(ref msg) if msg.contains("boom")));
}

#[tokio::test]
async fn unreachable_engine_is_a_connection_error() {
    let provider = provider(SolrSettings::new("http://127.0.0.1:1/solr/ckan"));
    let err = provider.commit().await.unwrap_err();
    assert!(matches!(err, SearchError::ConnectionError(_)));
}

#[tokio::test]
async fn enumeration_pages_by_row_cap_in_id_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/select"))
        .and(query_param("start", "0"))
        .and(query_param("rows", "2"))
        .and(query_param("sort", "id asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 3, "docs": [{ "id": "a" }, { "id": "b" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/select"))
        .and(query_param("start", "2"))
        .and(query_param("sort", "id asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 3, "docs": [{ "id": "c" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ids = provider(settings(&server).with_rows_max(2))
        .get_all_entity_ids(10)
        .await
        .unwrap();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn get_index_returns_first_match_or_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/select"))
        .and(query_param(
            "fq",
            "+site_id:\"test-site\" +entity_type:\"package\" +(id:\"abc\" OR name:\"abc\")",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 1, "docs": [{ "id": "abc", "name": "rainfall" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/select"))
        .and(query_param(
            "fq",
            "+site_id:\"test-site\" +entity_type:\"package\" +(id:\"nope\" OR name:\"nope\")",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 0, "docs": [] }
        })))
        .mount(&server)
        .await;

    let provider = provider(settings(&server));
    let found = provider.get_index("abc").await.unwrap().unwrap();
    assert_eq!(found.name(), Some("rainfall"));
    assert!(provider.get_index("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn schema_fetch_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/schema"))
        .and(query_param("wt", "schema.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/admin/file/"))
        .and(query_param("file", "schema.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<schema version=\"2.9\"/>"))
        .mount(&server)
        .await;

    let provider = provider(settings(&server));
    let err = provider
        .fetch_schema(SchemaLocation::Managed)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::HttpError { status: 404, .. }));

    let body = provider.fetch_schema(SchemaLocation::Classic).await.unwrap();
    assert_eq!(body, "<schema version=\"2.9\"/>");
}

#[tokio::test]
async fn basic_auth_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/ckan/admin/ping"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(settings(&server).with_credentials("admin", "secret"));
    assert!(provider.is_available().await);
}

#[tokio::test]
async fn availability_is_false_when_unreachable_or_misconfigured() {
    assert!(!provider(SolrSettings::new("http://127.0.0.1:1/solr/ckan")).is_available().await);
    assert!(!provider(SolrSettings::new("")).is_available().await);
}
