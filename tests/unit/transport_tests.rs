use groupware_dav::webdav::{Transport, etag_from_headers, render_exchange, strip_etag_quotes};
use hyper::http::{HeaderMap, HeaderValue};

fn transport() -> Transport {
    Transport::new("https://dav.example/dav/", Some("jdoe"), Some("secret")).unwrap()
}

#[test]
fn test_new_requires_absolute_uri() {
    assert!(Transport::new("/dav/", None, None).is_err());
    assert!(Transport::new("not a uri", None, None).is_err());
}

#[test]
fn test_root_path_always_ends_with_slash() {
    let t = Transport::new("https://dav.example/dav", None, None).unwrap();
    assert_eq!(t.root_path(), "/dav/");

    let t = Transport::new("https://dav.example", None, None).unwrap();
    assert_eq!(t.root_path(), "/");
}

#[test]
fn test_build_uri_relative_and_absolute_paths_agree() {
    let t = transport();
    let relative = t.build_uri("calendars/jdoe/").unwrap();
    let absolute = t.build_uri("/dav/calendars/jdoe/").unwrap();
    assert_eq!(relative.to_string(), "https://dav.example/dav/calendars/jdoe/");
    assert_eq!(relative, absolute);
}

#[test]
fn test_build_uri_empty_path_is_base() {
    let t = transport();
    assert_eq!(t.build_uri("").unwrap().to_string(), "https://dav.example/dav/");
}

#[test]
fn test_build_uri_keeps_query_and_full_urls() {
    let t = transport();
    assert_eq!(
        t.build_uri("calendars/?export").unwrap().to_string(),
        "https://dav.example/dav/calendars/?export"
    );
    assert_eq!(
        t.build_uri("https://other.example/x").unwrap().to_string(),
        "https://other.example/x"
    );
}

#[test]
fn test_relativize_strips_root_prefix() {
    let t = transport();
    assert_eq!(t.relativize("/dav/calendars/jdoe/"), "calendars/jdoe/");
    assert_eq!(t.relativize("https://dav.example/dav/calendars/jdoe/"), "calendars/jdoe/");
    assert_eq!(t.relativize("calendars/jdoe/"), "calendars/jdoe/");
    assert_eq!(t.relativize("/elsewhere/x"), "/elsewhere/x");
}

#[test]
fn test_relativize_then_absolutize_reproduces_server_path() {
    for root in ["https://dav.example/", "https://dav.example/dav/", "https://dav.example/a/b/"] {
        let t = Transport::new(root, None, None).unwrap();
        for rest in ["calendars/jdoe/", "addressbooks/jdoe/Default/1.vcf", "x"] {
            let server_href = format!("{}{rest}", t.root_path());
            let stored = t.relativize(&server_href);
            assert_eq!(stored, rest);
            assert_eq!(t.absolutize(&stored), server_href);
            assert_eq!(t.build_uri(&stored).unwrap().path(), server_href);
        }
    }
}

#[test]
fn test_root_without_trailing_slash_is_not_doubled() {
    let t = Transport::new("https://dav.example/dav", None, None).unwrap();
    assert_eq!(t.build_uri("/dav").unwrap().to_string(), "https://dav.example/dav");
    assert_eq!(t.build_uri("/dav/").unwrap().to_string(), "https://dav.example/dav");
    assert_eq!(t.relativize("/dav"), "");
    assert_eq!(t.relativize("https://dav.example/dav"), "");
    assert_eq!(t.absolutize(&t.relativize("/dav")), "/dav/");
    assert_eq!(
        t.build_uri("/dav/calendars/").unwrap().to_string(),
        "https://dav.example/dav/calendars/"
    );
}

#[test]
fn test_root_with_trailing_slash_accepts_bare_root() {
    let t = transport();
    assert_eq!(t.build_uri("/dav").unwrap().to_string(), "https://dav.example/dav/");
    assert_eq!(t.build_uri("/dav/").unwrap().to_string(), "https://dav.example/dav/");
    assert_eq!(t.relativize("/dav"), "");
    assert_eq!(t.relativize("/dav/"), "");
    assert_eq!(t.absolutize("/dav"), "/dav/");
    assert_eq!(t.relativize("/davical/x"), "/davical/x");
}

#[test]
fn test_strip_etag_quotes() {
    assert_eq!(strip_etag_quotes("\"abc123\""), "abc123");
    assert_eq!(strip_etag_quotes("abc123"), "abc123");
    assert_eq!(strip_etag_quotes("W/\"weak\""), "W/\"weak\"");
    assert_eq!(strip_etag_quotes("\""), "\"");
}

#[test]
fn test_etag_from_headers() {
    let mut headers = HeaderMap::new();
    assert_eq!(etag_from_headers(&headers), None);

    headers.insert("ETag", HeaderValue::from_static("\"abc123\""));
    assert_eq!(etag_from_headers(&headers), Some("abc123".to_string()));

    headers.insert("ETag", HeaderValue::from_bytes(b"\xFF\xFE").unwrap());
    assert_eq!(etag_from_headers(&headers), None);
}

#[test]
fn test_render_exchange_redacts_authorization() {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Basic amRvZTpzZWNyZXQ="));
    headers.insert("depth", HeaderValue::from_static("1"));

    let dump = render_exchange(&headers, b"");
    assert!(dump.contains("authorization: [REDACTED]"));
    assert!(dump.contains("depth: 1"));
    assert!(!dump.contains("amRvZTpzZWNyZXQ="));
}

#[test]
fn test_render_exchange_pretty_prints_xml() {
    let dump = render_exchange(
        &HeaderMap::new(),
        br#"<?xml version="1.0"?><d:prop xmlns:d="DAV:"><d:getetag/></d:prop>"#,
    );
    assert!(dump.contains("\n  <d:getetag/>\n"));

    let raw = render_exchange(&HeaderMap::new(), b"BEGIN:VCARD");
    assert!(raw.ends_with("BEGIN:VCARD"));
}

#[test]
fn test_transport_debug_hides_credentials() {
    let dump = format!("{:?}", transport());
    assert!(!dump.contains("secret"));
    assert!(dump.contains("dav.example"));
}
