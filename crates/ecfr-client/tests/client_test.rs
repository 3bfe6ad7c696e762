//! Contract tests for EcfrClient against a wiremock stand-in for the eCFR API.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/admin/v1/agencies.json` | `fetch_agencies_*` |
//! | GET | `/versioner/v1/titles.json` | `fetch_titles_*` |
//! | GET | `/versioner/v1/structure/{date}/title-{n}.json` | `fetch_structure_*` |

use ecfr_client::{EcfrApiError, EcfrClient, EcfrConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> EcfrClient {
    EcfrClient::new(EcfrConfig::local_mock(&mock_server.uri()).unwrap()).unwrap()
}

// ── GET /admin/v1/agencies.json ──────────────────────────────────────

#[tokio::test]
async fn fetch_agencies_returns_upstream_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v1/agencies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "agencies": [
                {
                    "name": "Department of Transportation",
                    "short_name": "DOT",
                    "display_name": "Department of Transportation",
                    "sortable_name": "Transportation, Department of",
                    "slug": "transportation-department",
                    "children": [],
                    "cfr_references": [{"title": 49, "subtitle": "A"}]
                },
                {
                    "name": "Environmental Protection Agency",
                    "short_name": "EPA",
                    "slug": "environmental-protection-agency",
                    "cfr_references": [{"title": 40, "chapter": "I"}]
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agencies = test_client(&mock_server).fetch_agencies().await.unwrap();
    assert_eq!(agencies.len(), 2);
    assert_eq!(agencies[0].slug, "transportation-department");
    assert_eq!(agencies[0].cfr_references[0].subtitle.as_deref(), Some("A"));
    assert_eq!(agencies[0].cfr_references[0].chapter, None);
    assert_eq!(agencies[1].cfr_references[0].title, 40);
}

#[tokio::test]
async fn fetch_agencies_surfaces_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v1/agencies.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).fetch_agencies().await.unwrap_err();
    match err {
        EcfrApiError::ApiError {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "GET /admin/v1/agencies.json");
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_agencies_makes_a_single_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v1/agencies.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(test_client(&mock_server).fetch_agencies().await.is_err());
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn fetch_agencies_rejects_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v1/agencies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).fetch_agencies().await.unwrap_err();
    assert!(matches!(err, EcfrApiError::Deserialization { .. }));
    assert_eq!(err.endpoint(), Some("GET /admin/v1/agencies.json"));
}

// ── GET /versioner/v1/titles.json ────────────────────────────────────

#[tokio::test]
async fn fetch_titles_parses_currency_dates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versioner/v1/titles.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "titles": [
                {
                    "number": 1,
                    "name": "General Provisions",
                    "latest_amended_on": "2022-12-29",
                    "latest_issue_date": "2024-05-17",
                    "up_to_date_as_of": "2025-07-31",
                    "reserved": false
                },
                {"number": 35, "name": "Panama Canal", "reserved": true}
            ],
            "meta": {"date": "2025-07-31", "import_in_progress": false}
        })))
        .mount(&mock_server)
        .await;

    let titles = test_client(&mock_server).fetch_titles().await.unwrap();
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[0].structure_date(), Some("2025-07-31"));
    assert!(titles[1].reserved);
    assert_eq!(titles[1].structure_date(), None);
}

#[tokio::test]
async fn fetch_titles_empty_body_is_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versioner/v1/titles.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    assert!(test_client(&mock_server).fetch_titles().await.unwrap().is_empty());
}

// ── GET /versioner/v1/structure/{date}/title-{n}.json ────────────────

#[tokio::test]
async fn fetch_structure_requests_dated_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versioner/v1/structure/2025-07-31/title-40.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "identifier": "40",
            "label": "Title 40 - Protection of Environment",
            "type": "title",
            "reserved": false,
            "children": [
                {"identifier": "I", "type": "chapter", "label_level": "Chapter I"},
                {"identifier": "II", "type": "chapter"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = test_client(&mock_server)
        .fetch_title_structure(40, "2025-07-31")
        .await
        .unwrap();
    assert_eq!(root.identifier, "40");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].label_level.as_deref(), Some("Chapter I"));
}

#[tokio::test]
async fn fetch_structure_404_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versioner/v1/structure/2025-07-31/title-99.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .fetch_title_structure(99, "2025-07-31")
        .await
        .unwrap_err();
    assert!(matches!(err, EcfrApiError::ApiError { status: 404, .. }));
    assert_eq!(
        err.endpoint(),
        Some("GET /versioner/v1/structure/2025-07-31/title-99.json")
    );
}

#[tokio::test]
async fn connection_refused_is_http_error() {
    // Nothing listens on this port once the server is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = EcfrClient::new(EcfrConfig::local_mock(&uri).unwrap()).unwrap();
    let err = client.fetch_titles().await.unwrap_err();
    assert!(matches!(err, EcfrApiError::Http { .. }));
}
