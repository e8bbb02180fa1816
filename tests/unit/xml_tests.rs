use groupware_dav::webdav::{XmlElement, escape_xml, has_xml_declaration};

#[test]
fn test_escape_xml_special_characters() {
    assert_eq!(
        escape_xml(r#"Tom & "Jerry" <cat>'s"#),
        "Tom &amp; &quot;Jerry&quot; &lt;cat&gt;&apos;s"
    );
    assert_eq!(escape_xml("plain"), "plain");
}

#[test]
fn test_builder_renders_compact_document() {
    let xml = XmlElement::new("d:propfind")
        .attr("xmlns:d", "DAV:")
        .child(XmlElement::new("d:prop").child(XmlElement::new("d:displayname")));

    assert_eq!(
        xml.to_document(),
        r#"<?xml version="1.0" encoding="utf-8"?><d:propfind xmlns:d="DAV:"><d:prop><d:displayname/></d:prop></d:propfind>"#
    );
}

#[test]
fn test_builder_escapes_text_and_attributes() {
    let xml = XmlElement::new("d:displayname")
        .attr("title", "a\"b")
        .text("Work & <Play>");

    assert_eq!(
        xml.to_string(),
        r#"<d:displayname title="a&quot;b">Work &amp; &lt;Play&gt;</d:displayname>"#
    );
}

#[test]
fn test_has_xml_declaration() {
    assert!(has_xml_declaration(b"<?xml version=\"1.0\"?><a/>"));
    assert!(has_xml_declaration(b"\n  <?xml version=\"1.0\"?><a/>"));
    assert!(has_xml_declaration(b"\xEF\xBB\xBF<?xml version=\"1.0\"?><a/>"));
    assert!(!has_xml_declaration(b"<a/>"));
    assert!(!has_xml_declaration(b"BEGIN:VCALENDAR"));
    assert!(!has_xml_declaration(b""));
}

#[test]
fn test_parse_resolves_namespaces_and_local_names() {
    let body = br#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/dav/calendars/jdoe/personal/</D:href>
    <D:propstat>
      <D:prop>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
        </C:supported-calendar-component-set>
      </D:prop>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let root = XmlElement::parse(body).unwrap();
    assert_eq!(root.name(), "D:multistatus");
    assert_eq!(root.local_name(), "multistatus");
    assert_eq!(root.namespace(), Some("DAV:"));

    let href = root.first_descendant("href").unwrap();
    assert_eq!(href.text_content(), "/dav/calendars/jdoe/personal/");

    let comp = root.first_descendant("comp").unwrap();
    assert_eq!(comp.namespace(), Some("urn:ietf:params:xml:ns:caldav"));
    assert_eq!(comp.attribute("name"), Some("VEVENT"));
}

#[test]
fn test_parse_default_namespace() {
    let body = br#"<?xml version="1.0"?><multistatus xmlns="DAV:"><response><href>/a</href></response></multistatus>"#;
    let root = XmlElement::parse(body).unwrap();
    assert!(root.is("multistatus"));
    assert_eq!(root.namespace(), Some("DAV:"));
    assert_eq!(root.descendants("response").len(), 1);
}

#[test]
fn test_parse_unescapes_entities_and_keeps_whitespace() {
    let body = b"<?xml version=\"1.0\"?><d:x xmlns:d=\"DAV:\">line 1\nA &amp; B &lt;3</d:x>";
    let root = XmlElement::parse(body).unwrap();
    assert_eq!(root.text_content(), "line 1\nA & B <3");
}

#[test]
fn test_parse_cdata() {
    let body = b"<?xml version=\"1.0\"?><x><![CDATA[BEGIN:VCARD & more]]></x>";
    let root = XmlElement::parse(body).unwrap();
    assert_eq!(root.text_content(), "BEGIN:VCARD & more");
}

#[test]
fn test_parse_rejects_malformed_documents() {
    assert!(XmlElement::parse(b"<?xml version=\"1.0\"?><a><b></a>").is_err());
    assert!(XmlElement::parse(b"<?xml version=\"1.0\"?><a>").is_err());
    assert!(XmlElement::parse(b"<?xml version=\"1.0\"?>").is_err());
}

#[test]
fn test_parse_error_is_parse_variant() {
    let err = XmlElement::parse(b"<?xml version=\"1.0\"?><a>").unwrap_err();
    assert!(matches!(err, groupware_dav::DavError::Parse(_)));
    assert!(!err.is_transport());
}

#[test]
fn test_descendants_in_document_order() {
    let xml = XmlElement::new("root")
        .child(XmlElement::new("d:href").text("1"))
        .child(XmlElement::new("nested").child(XmlElement::new("D:HREF").text("2")))
        .child(XmlElement::new("href").text("3"));

    let texts: Vec<String> = xml
        .descendants("href")
        .into_iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(texts, vec!["1", "2", "3"]);
}

#[test]
fn test_pretty_string_indents_children() {
    let xml = XmlElement::new("a").child(XmlElement::new("b").text("x"));
    assert_eq!(
        xml.to_pretty_string(),
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<a>\n  <b>x</b>\n</a>\n"
    );
}

#[test]
fn test_attribute_lookup_ignores_namespace_declarations() {
    let xml = XmlElement::new("c:comp")
        .attr("xmlns:name", "urn:x")
        .attr("c:name", "VTODO");
    assert_eq!(xml.attribute("name"), Some("VTODO"));
    assert_eq!(xml.attribute("c:name"), Some("VTODO"));
    assert_eq!(xml.attribute("missing"), None);
}
