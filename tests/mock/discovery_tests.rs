use groupware_dav::{ComponentKind, DavError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{
    PRINCIPAL, home_set_response, mount_calendar_discovery, multistatus, principal_response,
    test_client,
};

#[tokio::test]
async fn discover_event_home_is_root_relative() {
    let server = MockServer::start().await;
    mount_calendar_discovery(&server).await;
    let client = test_client(&server);

    let found = client
        .discover(ComponentKind::Event)
        .await
        .expect("discovery")
        .expect("home");

    assert_eq!(found.principal_href, "principals/users/jdoe/");
    assert_eq!(found.home_href, "calendars/jdoe/");
}

#[tokio::test]
async fn discover_sends_basic_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(header("Authorization", "Basic amRvZTpzZWNyZXQ="))
        .respond_with(ResponseTemplate::new(207).set_body_string(multistatus("")))
        .expect(1)
        .mount(&server)
        .await;
    let client = test_client(&server);

    assert_eq!(client.discover(ComponentKind::Event).await.expect("discovery"), None);
}

#[tokio::test]
async fn discover_is_idempotent() {
    let server = MockServer::start().await;
    mount_calendar_discovery(&server).await;
    let client = test_client(&server);

    let first = client.discover(ComponentKind::Task).await.expect("first");
    let second = client.discover(ComponentKind::Task).await.expect("second");

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(4));
}

#[tokio::test]
async fn discover_contact_uses_addressbook_vocabulary() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_string(principal_response("addressbooks")))
        .mount(&server)
        .await;
    Mock::given(method("PROPFIND"))
        .and(path(PRINCIPAL))
        .and(body_string_contains("urn:ietf:params:xml:ns:carddav"))
        .and(body_string_contains("addressbook-home-set"))
        .respond_with(ResponseTemplate::new(207).set_body_string(home_set_response(
            "addressbook-home-set",
            "card",
            "https://elsewhere.example/dav/addressbooks/jdoe/",
        )))
        .mount(&server)
        .await;
    let client = test_client(&server);

    let found = client
        .discover(ComponentKind::Contact)
        .await
        .expect("discovery")
        .expect("home");
    assert_eq!(found.home_href, "addressbooks/jdoe/");
}

#[tokio::test]
async fn discover_without_principal_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/"))
        .respond_with(ResponseTemplate::new(207).set_body_string(multistatus(
            r#"<d:response>
  <d:href>/dav/calendars/</d:href>
  <d:propstat>
    <d:prop><d:current-user-principal/></d:prop>
    <d:status>HTTP/1.1 404 Not Found</d:status>
  </d:propstat>
</d:response>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;
    let client = test_client(&server);

    let result = client.discover(ComponentKind::Event).await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn discover_without_home_set_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/"))
        .respond_with(ResponseTemplate::new(207).set_body_string(principal_response("calendars")))
        .mount(&server)
        .await;
    Mock::given(method("PROPFIND"))
        .and(path(PRINCIPAL))
        .respond_with(ResponseTemplate::new(207).set_body_string(multistatus(&format!(
            "<d:response><d:href>{PRINCIPAL}</d:href></d:response>"
        ))))
        .mount(&server)
        .await;
    let client = test_client(&server);

    assert_eq!(client.discover(ComponentKind::Event).await.expect("discovery"), None);
    assert!(client.list_folders(ComponentKind::Event).await.expect("listing").is_none());
    assert!(!client.healthcheck().await.expect("healthcheck"));
}

#[tokio::test]
async fn discover_transport_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let client = test_client(&server);

    let err = client
        .discover(ComponentKind::Event)
        .await
        .expect_err("503 must fail");
    assert!(err.is_transport());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

#[tokio::test]
async fn discover_malformed_xml_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .respond_with(
            ResponseTemplate::new(207)
                .set_body_string(r#"<?xml version="1.0"?><d:multistatus xmlns:d="DAV:"><d:response>"#),
        )
        .mount(&server)
        .await;
    let client = test_client(&server);

    let err = client
        .discover(ComponentKind::Event)
        .await
        .expect_err("truncated body");
    assert!(matches!(err, DavError::Parse(_)));
}

#[tokio::test]
async fn healthcheck_succeeds_with_calendar_home() {
    let server = MockServer::start().await;
    mount_calendar_discovery(&server).await;
    let client = test_client(&server);

    assert!(client.healthcheck().await.expect("healthcheck"));
}

#[tokio::test]
async fn options_returns_dav_capabilities() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path("/dav/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("DAV", "1, 2, 3,  calendar-access, addressbook"),
        )
        .mount(&server)
        .await;
    let client = test_client(&server);

    let caps = client.options().await.expect("options");
    assert_eq!(caps, vec!["1", "2", "3", "calendar-access", "addressbook"]);
    assert!(client.last_response_headers().contains_key("dav"));
}
