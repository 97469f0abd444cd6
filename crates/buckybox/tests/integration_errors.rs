//! Error classification end to end, against a wiremock server

mod common;

use assert_matches::assert_matches;
use buckybox::{Client, Environment, Error, QueryParams};
use rstest::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn webstore_error(template: ResponseTemplate) -> Error {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/webstore"))
        .respond_with(template)
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server.uri());
    client.webstore().await.unwrap_err()
}

/// Parametrized test for error statuses and how they are classified
#[rstest]
#[case(204, false)]
#[case(403, false)]
#[case(400, false)]
#[case(401, false)]
#[case(404, true)]
#[case(422, false)]
#[case(500, false)]
#[case(503, false)]
#[tokio::test]
async fn test_error_status_codes(#[case] status: u16, #[case] not_found: bool) {
    let err = webstore_error(
        ResponseTemplate::new(status).set_body_string(r#"{"message":"nope"}"#),
    )
    .await;

    assert_eq!(err.is_not_found(), not_found);
    assert_eq!(err.status(), Some(status));
    if not_found {
        assert_matches!(err, Error::NotFound(_));
    } else {
        assert_matches!(err, Error::Response(_));
    }
}

/// Parametrized test for message extraction from error bodies
#[rstest]
#[case(r#"{"message":"Invalid API key"}"#, "Error 401 - Invalid API key")]
#[case("", "Error 401 - Empty response")]
#[case("null", "Error 401 - Empty response")]
#[case(r#"{"error":"unauthorised"}"#, r#"Error 401 - {"error":"unauthorised"}"#)]
#[case("Unauthorised\n", "Error 401 - Unauthorised")]
#[tokio::test]
async fn test_error_messages(#[case] body: &str, #[case] expected: &str) {
    let err = webstore_error(ResponseTemplate::new(401).set_body_string(body)).await;
    assert_eq!(err.to_string(), expected);
}

#[tokio::test]
async fn test_success_with_html_body_is_decode_error() {
    let err = webstore_error(ResponseTemplate::new(200).set_body_string("<html></html>")).await;
    assert_matches!(err, Error::Decode(_));
}

#[tokio::test]
async fn test_success_with_empty_body_cannot_be_wrapped() {
    let err = webstore_error(ResponseTemplate::new(200)).await;
    assert_matches!(err, Error::Argument(message) if message == "null");
}

#[tokio::test]
async fn test_array_of_scalars_fails_coercion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2]"))
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server.uri());
    let err = client
        .customers_with(QueryParams::new(), buckybox::QueryOptions::default())
        .await
        .unwrap_err();

    // The type map needs `account_balance`, so coercion fails before wrapping.
    assert_matches!(err, Error::MissingAttribute { attribute } if attribute == "account_balance");
}

#[tokio::test]
async fn test_wrong_shape_for_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/webstore"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&mock_server)
        .await;

    let client = common::client_for(&mock_server.uri());
    let err = client.webstore().await.unwrap_err();

    assert_matches!(
        err,
        Error::UnexpectedResponse {
            expected: "object",
            found: "array"
        }
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = Client::builder()
        .environment(Environment::Test)
        .base_url("http://127.0.0.1:9/v1")
        .build()
        .unwrap();

    let err = client.webstore().await.unwrap_err();
    assert_matches!(err, Error::Transport(_));
}

/// Parametrized test for invalid base URLs
#[rstest]
#[case("not-a-url")]
#[case("ftp://invalid.com")]
#[case("")]
fn test_client_builder_invalid_base_url(#[case] base_url: &str) {
    let result = Client::builder()
        .environment(Environment::Test)
        .base_url(base_url)
        .build();

    assert_matches!(result, Err(Error::InvalidUrl(_)), "for base URL {base_url:?}");
}
