//! Component kinds and the per-kind protocol vocabulary.

use std::fmt;
use std::str::FromStr;

use crate::dav::object::{Contact, DavObject, Event, Task};
use crate::error::DavError;
use crate::webdav::xml::XmlElement;

pub const NS_DAV: &str = "DAV:";
pub const NS_CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
pub const NS_CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
pub const NS_CALENDARSERVER: &str = "http://calendarserver.org/ns/";
pub const NS_APPLE_ICAL: &str = "http://apple.com/ns/ical/";
/// Vendor namespace carrying the folder alarm flag.
pub const NS_KOLAB: &str = "Kolab:";

/// Fixed protocol metadata of one component kind.
#[derive(Debug)]
struct KindInfo {
    component: &'static str,
    namespace: &'static str,
    root_segment: &'static str,
    resource_type: &'static str,
    home_set: &'static str,
    query_report: &'static str,
    multiget_report: &'static str,
    data_element: &'static str,
    content_type: &'static str,
}

const EVENT: KindInfo = KindInfo {
    component: "VEVENT",
    namespace: NS_CALDAV,
    root_segment: "calendars",
    resource_type: "calendar",
    home_set: "calendar-home-set",
    query_report: "calendar-query",
    multiget_report: "calendar-multiget",
    data_element: "calendar-data",
    content_type: "text/calendar; charset=utf-8",
};

const TASK: KindInfo = KindInfo {
    component: "VTODO",
    ..EVENT
};

const CONTACT: KindInfo = KindInfo {
    component: "VCARD",
    namespace: NS_CARDDAV,
    root_segment: "addressbooks",
    resource_type: "addressbook",
    home_set: "addressbook-home-set",
    query_report: "addressbook-query",
    multiget_report: "addressbook-multiget",
    data_element: "address-data",
    content_type: "text/vcard; charset=utf-8",
};

/// The closed set of object kinds stored on the DAV server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Event,
    Task,
    Contact,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [Self::Event, Self::Task, Self::Contact];

    fn info(self) -> &'static KindInfo {
        match self {
            Self::Event => &EVENT,
            Self::Task => &TASK,
            Self::Contact => &CONTACT,
        }
    }

    /// iCalendar/vCard component name (`VEVENT`, `VTODO`, `VCARD`).
    pub fn component_name(self) -> &'static str {
        self.info().component
    }

    /// Namespace of the kind's DAV extension (CalDAV or CardDAV).
    pub fn namespace(self) -> &'static str {
        self.info().namespace
    }

    /// Collection segment under which principals and homes live.
    pub fn root_segment(self) -> &'static str {
        self.info().root_segment
    }

    /// `resourcetype` child marking a collection of this kind.
    pub fn resource_type(self) -> &'static str {
        self.info().resource_type
    }

    pub fn home_set_property(self) -> &'static str {
        self.info().home_set
    }

    pub fn query_report(self) -> &'static str {
        self.info().query_report
    }

    pub fn multiget_report(self) -> &'static str {
        self.info().multiget_report
    }

    pub fn data_element(self) -> &'static str {
        self.info().data_element
    }

    /// Content type used when storing objects of this kind.
    pub fn content_type(self) -> &'static str {
        self.info().content_type
    }

    pub fn is_calendar(self) -> bool {
        self.namespace() == NS_CALDAV
    }

    /// Build the concrete object for a multistatus `response` element.
    pub fn object_from_response(self, response: &XmlElement) -> DavObject {
        match self {
            Self::Event => DavObject::Event(Event::from_response(response)),
            Self::Task => DavObject::Task(Task::from_response(response)),
            Self::Contact => DavObject::Contact(Contact::from_response(response)),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component_name())
    }
}

impl FromStr for ComponentKind {
    type Err = DavError;

    /// Accepts component names (`VEVENT`) and plain kind names (`event`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VEVENT" | "EVENT" => Ok(Self::Event),
            "VTODO" | "TASK" => Ok(Self::Task),
            "VCARD" | "CONTACT" => Ok(Self::Contact),
            _ => Err(DavError::UnknownComponent(s.to_string())),
        }
    }
}
