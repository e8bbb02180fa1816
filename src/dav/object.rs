//! Calendar, task and contact objects.
//!
//! Payloads are opaque: the client stores and transfers iCalendar/vCard text
//! but never interprets it.

use bytes::Bytes;

use crate::dav::kind::ComponentKind;
use crate::dav::multistatus::{find_prop, prop_text, response_href};
use crate::webdav::types::strip_etag_quotes;
use crate::webdav::xml::XmlElement;

/// State shared by every object kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectData {
    href: String,
    etag: Option<String>,
    data: Option<String>,
}

impl ObjectData {
    fn new(href: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            etag: None,
            data: Some(data.into()),
        }
    }

    fn from_response(kind: ComponentKind, response: &XmlElement) -> Self {
        Self {
            href: response_href(response).unwrap_or_default(),
            etag: prop_text(response, "getetag").map(|etag| strip_etag_quotes(&etag).to_string()),
            // keep the payload byte-exact, it is often multi-line
            data: find_prop(response, kind.data_element()).map(XmlElement::text_content),
        }
    }

    pub(crate) fn set_href(&mut self, href: String) {
        self.href = href;
    }

    pub(crate) fn set_etag(&mut self, etag: String) {
        self.etag = Some(etag);
    }
}

/// Contract shared by [`Event`], [`Task`], [`Contact`] and [`DavObject`].
pub trait CommonObject {
    fn kind(&self) -> ComponentKind;

    fn object(&self) -> &ObjectData;

    fn object_mut(&mut self) -> &mut ObjectData;

    /// Location relative to the configured root.
    fn href(&self) -> &str {
        &self.object().href
    }

    /// Entity tag without surrounding quotes; `None` until the server reported one.
    fn etag(&self) -> Option<&str> {
        self.object().etag.as_deref()
    }

    /// Raw iCalendar/vCard payload, if known.
    fn data(&self) -> Option<&str> {
        self.object().data.as_deref()
    }

    fn content_type(&self) -> &'static str {
        self.kind().content_type()
    }

    /// Request body for a `PUT`.
    fn serialize(&self) -> Bytes {
        Bytes::from(self.data().unwrap_or_default().to_owned())
    }
}

/// A calendar event (`VEVENT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    inner: ObjectData,
}

impl Event {
    pub fn new(href: impl Into<String>, ical: impl Into<String>) -> Self {
        Self {
            inner: ObjectData::new(href, ical),
        }
    }

    pub fn from_response(response: &XmlElement) -> Self {
        Self {
            inner: ObjectData::from_response(ComponentKind::Event, response),
        }
    }
}

impl CommonObject for Event {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Event
    }

    fn object(&self) -> &ObjectData {
        &self.inner
    }

    fn object_mut(&mut self) -> &mut ObjectData {
        &mut self.inner
    }
}

/// A task (`VTODO`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    inner: ObjectData,
}

impl Task {
    pub fn new(href: impl Into<String>, ical: impl Into<String>) -> Self {
        Self {
            inner: ObjectData::new(href, ical),
        }
    }

    pub fn from_response(response: &XmlElement) -> Self {
        Self {
            inner: ObjectData::from_response(ComponentKind::Task, response),
        }
    }
}

impl CommonObject for Task {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Task
    }

    fn object(&self) -> &ObjectData {
        &self.inner
    }

    fn object_mut(&mut self) -> &mut ObjectData {
        &mut self.inner
    }
}

/// An address book entry (`VCARD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    inner: ObjectData,
}

impl Contact {
    pub fn new(href: impl Into<String>, vcard: impl Into<String>) -> Self {
        Self {
            inner: ObjectData::new(href, vcard),
        }
    }

    pub fn from_response(response: &XmlElement) -> Self {
        Self {
            inner: ObjectData::from_response(ComponentKind::Contact, response),
        }
    }
}

impl CommonObject for Contact {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Contact
    }

    fn object(&self) -> &ObjectData {
        &self.inner
    }

    fn object_mut(&mut self) -> &mut ObjectData {
        &mut self.inner
    }
}

/// Any object kind, as returned by search and multiget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavObject {
    Event(Event),
    Task(Task),
    Contact(Contact),
}

impl CommonObject for DavObject {
    fn kind(&self) -> ComponentKind {
        match self {
            DavObject::Event(_) => ComponentKind::Event,
            DavObject::Task(_) => ComponentKind::Task,
            DavObject::Contact(_) => ComponentKind::Contact,
        }
    }

    fn object(&self) -> &ObjectData {
        match self {
            DavObject::Event(o) => o.object(),
            DavObject::Task(o) => o.object(),
            DavObject::Contact(o) => o.object(),
        }
    }

    fn object_mut(&mut self) -> &mut ObjectData {
        match self {
            DavObject::Event(o) => o.object_mut(),
            DavObject::Task(o) => o.object_mut(),
            DavObject::Contact(o) => o.object_mut(),
        }
    }
}

impl From<Event> for DavObject {
    fn from(event: Event) -> Self {
        DavObject::Event(event)
    }
}

impl From<Task> for DavObject {
    fn from(task: Task) -> Self {
        DavObject::Task(task)
    }
}

impl From<Contact> for DavObject {
    fn from(contact: Contact) -> Self {
        DavObject::Contact(contact)
    }
}
