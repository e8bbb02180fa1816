use groupware_dav::{DavClient, DavConfig, DavError};
use hyper::{Method, StatusCode};
use tokio::time::Duration;

#[test]
fn test_config_defaults_on_deserialize() {
    let config: DavConfig = serde_json::from_str(
        r#"{"uri": "https://dav.example/dav/", "username": "jdoe", "password": "secret"}"#,
    )
    .unwrap();

    assert_eq!(config.uri, "https://dav.example/dav/");
    assert_eq!(config.password, "secret");
    assert_eq!(config.timeout_secs, 20);
    assert!(!config.debug);
}

#[test]
fn test_config_password_not_serialized() {
    let config = DavConfig::new("https://dav.example/dav/", "jdoe", "secret");
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("secret"));
    assert!(!json.contains("password"));
    assert!(json.contains("\"timeout_secs\":20"));
}

#[test]
fn test_config_debug_redacts_password() {
    let config = DavConfig::new("https://dav.example/dav/", "jdoe", "secret");
    let dump = format!("{config:?}");
    assert!(dump.contains("[REDACTED]"));
    assert!(!dump.contains("secret"));
}

#[test]
fn test_client_from_config() {
    let config = DavConfig::new("https://dav.example/dav/", "jdoe", "secret");
    let client = DavClient::from_config(&config).unwrap();
    assert_eq!(client.transport().root_path(), "/dav/");

    let bad = DavConfig::new("dav.example", "jdoe", "secret");
    assert!(matches!(DavClient::from_config(&bad), Err(DavError::InvalidUri(_))));
}

#[test]
fn test_principal_location() {
    let client = DavClient::new("https://dav.example/dav/", "jdoe", "secret").unwrap();
    assert_eq!(
        client.principal_location("jack@example.org"),
        "/dav/principals/user/jack@example.org"
    );
}

#[test]
fn test_error_classification() {
    let status = DavError::Status {
        method: Method::PUT,
        uri: "https://dav.example/dav/x".into(),
        status: StatusCode::PRECONDITION_FAILED,
    };
    assert!(status.is_transport());
    assert_eq!(status.status(), Some(StatusCode::PRECONDITION_FAILED));
    assert!(status.to_string().contains("412"));

    assert!(DavError::Timeout(Duration::from_secs(20)).is_transport());
    assert!(!DavError::Parse("bad".into()).is_transport());
    assert!(!DavError::EmptyObject("x".into()).is_transport());
    assert_eq!(DavError::Parse("bad".into()).status(), None);
}
