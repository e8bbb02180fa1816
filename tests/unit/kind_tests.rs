use groupware_dav::dav::{NS_CALDAV, NS_CARDDAV};
use groupware_dav::{ComponentKind, DavError};

#[test]
fn test_kind_metadata_calendar() {
    let kind = ComponentKind::Event;
    assert_eq!(kind.component_name(), "VEVENT");
    assert_eq!(kind.namespace(), NS_CALDAV);
    assert_eq!(kind.root_segment(), "calendars");
    assert_eq!(kind.home_set_property(), "calendar-home-set");
    assert_eq!(kind.query_report(), "calendar-query");
    assert_eq!(kind.multiget_report(), "calendar-multiget");
    assert_eq!(kind.data_element(), "calendar-data");
    assert!(kind.is_calendar());

    let task = ComponentKind::Task;
    assert_eq!(task.component_name(), "VTODO");
    assert_eq!(task.root_segment(), "calendars");
    assert_eq!(task.content_type(), kind.content_type());
}

#[test]
fn test_kind_metadata_contact() {
    let kind = ComponentKind::Contact;
    assert_eq!(kind.component_name(), "VCARD");
    assert_eq!(kind.namespace(), NS_CARDDAV);
    assert_eq!(kind.root_segment(), "addressbooks");
    assert_eq!(kind.home_set_property(), "addressbook-home-set");
    assert_eq!(kind.query_report(), "addressbook-query");
    assert_eq!(kind.multiget_report(), "addressbook-multiget");
    assert_eq!(kind.data_element(), "address-data");
    assert_eq!(kind.content_type(), "text/vcard; charset=utf-8");
    assert!(!kind.is_calendar());
}

#[test]
fn test_kind_from_str() {
    assert_eq!("VEVENT".parse::<ComponentKind>().unwrap(), ComponentKind::Event);
    assert_eq!("event".parse::<ComponentKind>().unwrap(), ComponentKind::Event);
    assert_eq!("vtodo".parse::<ComponentKind>().unwrap(), ComponentKind::Task);
    assert_eq!(" VCARD ".parse::<ComponentKind>().unwrap(), ComponentKind::Contact);
}

#[test]
fn test_kind_from_str_unknown_is_validation_error() {
    let err = "VJOURNAL".parse::<ComponentKind>().unwrap_err();
    assert!(matches!(err, DavError::UnknownComponent(ref name) if name == "VJOURNAL"));
    assert!(!err.is_transport());
}

#[test]
fn test_kind_display_round_trips() {
    for kind in ComponentKind::ALL {
        assert_eq!(kind.to_string().parse::<ComponentKind>().unwrap(), kind);
    }
}
