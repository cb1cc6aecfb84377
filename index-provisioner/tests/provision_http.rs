//! End-to-end provisioning against a mocked search service.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use index_provisioner::{provision, ProvisionError};
use index_provisioner_repository::{
    movies_mapping, ConnectionConfig, CredentialSource, IndexAdminError, IndexConfig,
};

fn connection(server: &MockServer, credentials: CredentialSource) -> ConnectionConfig {
    let address = server.address();
    ConnectionConfig::new(address.ip().to_string())
        .with_port(address.port())
        .with_tls(false)
        .with_credentials(credentials)
        .with_request_timeout(Duration::from_secs(5))
}

fn signed(server: &MockServer) -> ConnectionConfig {
    connection(
        server,
        CredentialSource::static_keys("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
    )
}

fn expected_mapping_body() -> Value {
    json!({
        "properties": {
            "title": {
                "type": "text",
                "fields": {
                    "keyword": {
                        "type": "keyword",
                        "ignore_above": 256
                    }
                }
            },
            "year": {
                "type": "long"
            }
        }
    })
}

fn acknowledged() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true }))
}

/// Answer existence checks in order: each status is served once, and the
/// last one is served for every check after that.
async fn mount_exists_sequence(server: &MockServer, statuses: &[u16]) {
    let (last, first) = statuses.split_last().expect("at least one status");
    for status in first {
        Mock::given(method("HEAD"))
            .and(path("/movies"))
            .respond_with(ResponseTemplate::new(*status))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(*last))
        .mount(server)
        .await;
}

async fn mount_readback(server: &MockServer, mapping_body: Value) {
    Mock::given(method("GET"))
        .and(path("/movies/_mapping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mapping_body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_all": {
                "primaries": {
                    "docs": { "count": 0, "deleted": 0 },
                    "store": { "size_in_bytes": 208 }
                }
            }
        })))
        .mount(server)
        .await;
}

async fn methods_received(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

#[tokio::test]
async fn test_provisions_missing_index_with_exact_mapping() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("DELETE"))
        .respond_with(acknowledged())
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping"))
        .and(body_json(expected_mapping_body()))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    mount_readback(&server, json!({ "movies": { "mappings": expected_mapping_body() } })).await;

    let report = provision(&signed(&server), &IndexConfig::default(), &movies_mapping())
        .await
        .unwrap();

    assert_eq!(report.index, "movies");
    assert!(!report.replaced_existing);
    assert_eq!(report.stats.map(|s| s.store_size_bytes), Some(208));
    assert_eq!(
        methods_received(&server).await,
        vec![
            "HEAD /movies",
            "PUT /movies",
            "HEAD /movies",
            "PUT /movies/_mapping",
            "HEAD /movies",
            "GET /movies/_mapping",
            "GET /movies/_stats",
        ]
    );
}

#[tokio::test]
async fn test_recreates_existing_index() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[200, 404, 200]).await;

    Mock::given(method("DELETE"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping"))
        .and(body_json(expected_mapping_body()))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    mount_readback(&server, json!({ "movies": { "mappings": expected_mapping_body() } })).await;

    let report = provision(&signed(&server), &IndexConfig::default(), &movies_mapping())
        .await
        .unwrap();

    assert!(report.replaced_existing);
    let received = methods_received(&server).await;
    assert_eq!(received[..4], ["HEAD /movies", "DELETE /movies", "HEAD /movies", "PUT /movies"]);
}

#[tokio::test]
async fn test_requests_are_signed_with_sigv4() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("PUT"))
        .and(header_exists("x-amz-date"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    mount_readback(&server, json!({ "movies": { "mappings": expected_mapping_body() } })).await;

    provision(&signed(&server), &IndexConfig::default(), &movies_mapping())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    for request in requests {
        let authorization = request
            .headers
            .get("authorization")
            .expect("authorization header")
            .to_str()
            .unwrap();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256"));
        assert!(authorization.contains("/us-east-2/es/aws4_request"));
    }
}

#[tokio::test]
async fn test_anonymous_requests_are_not_signed() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("PUT"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    mount_readback(&server, json!({ "movies": { "mappings": expected_mapping_body() } })).await;

    provision(
        &connection(&server, CredentialSource::Anonymous),
        &IndexConfig::default(),
        &movies_mapping(),
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test]
async fn test_delete_failure_never_attempts_create() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[200]).await;

    Mock::given(method("DELETE"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "type": "security_exception",
                "reason": "no permissions for [indices:admin/delete]"
            },
            "status": 403
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(acknowledged())
        .expect(0)
        .mount(&server)
        .await;

    let result = provision(&signed(&server), &IndexConfig::default(), &movies_mapping()).await;

    match result {
        Err(ProvisionError::SearchError(IndexAdminError::DeleteFailed(message))) => {
            assert!(message.contains("403"));
            assert!(message.contains("no permissions"));
        }
        other => panic!("expected delete failure, got {:?}", other),
    }
    assert_eq!(
        methods_received(&server).await,
        vec!["HEAD /movies", "DELETE /movies"]
    );
}

#[tokio::test]
async fn test_create_conflict_is_fatal() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404]).await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [movies/xyz] already exists"
            },
            "status": 400
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping"))
        .respond_with(acknowledged())
        .expect(0)
        .mount(&server)
        .await;

    let result = provision(&signed(&server), &IndexConfig::default(), &movies_mapping()).await;

    assert!(matches!(
        result,
        Err(ProvisionError::SearchError(IndexAdminError::IndexAlreadyExists(ref name))) if name == "movies"
    ));
}

#[tokio::test]
async fn test_unconfirmed_create_skips_mapping() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404]).await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping"))
        .respond_with(acknowledged())
        .expect(0)
        .mount(&server)
        .await;

    let result = provision(&signed(&server), &IndexConfig::default(), &movies_mapping()).await;

    assert!(matches!(result, Err(ProvisionError::CreateNotConfirmed(_))));
}

#[tokio::test]
async fn test_mapping_rejection_is_reported() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "mapper_parsing_exception",
                "reason": "No handler for type [long] declared on field [year]"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let result = provision(&signed(&server), &IndexConfig::default(), &movies_mapping()).await;

    assert!(matches!(
        result,
        Err(ProvisionError::SearchError(IndexAdminError::MappingFailed(_)))
    ));
    assert!(!methods_received(&server)
        .await
        .contains(&"GET /movies/_mapping".to_string()));
}

#[tokio::test]
async fn test_verification_fails_when_mapping_missing() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("PUT"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    mount_readback(&server, json!({ "movies": { "mappings": {} } })).await;

    let result = provision(&signed(&server), &IndexConfig::default(), &movies_mapping()).await;

    assert!(matches!(
        result,
        Err(ProvisionError::VerificationFailed { .. })
    ));
}

#[tokio::test]
async fn test_legacy_document_type_uses_typed_endpoint() {
    let server = MockServer::start().await;
    mount_exists_sequence(&server, &[404, 200]).await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(acknowledged())
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies/_mapping/movie"))
        .and(body_json(expected_mapping_body()))
        .respond_with(acknowledged())
        .expect(1)
        .mount(&server)
        .await;
    mount_readback(
        &server,
        json!({ "movies": { "mappings": { "movie": expected_mapping_body() } } }),
    )
    .await;

    let index = IndexConfig::default().with_document_type("movie");
    let report = provision(&signed(&server), &index, &movies_mapping())
        .await
        .unwrap();

    assert_eq!(report.document_type.as_deref(), Some("movie"));
}

#[tokio::test]
async fn test_unreachable_service_fails_without_mutation() {
    // Bind and drop a listener to get a local port with nothing behind it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let connection = ConnectionConfig::new("127.0.0.1")
        .with_port(port)
        .with_tls(false)
        .with_credentials(CredentialSource::Anonymous)
        .with_request_timeout(Duration::from_secs(5));

    let result = provision(&connection, &IndexConfig::default(), &movies_mapping()).await;

    match result {
        Err(ProvisionError::SearchError(e)) => assert!(e.is_connection()),
        other => panic!("expected connection failure, got {:?}", other),
    }
}
