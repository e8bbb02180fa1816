//! Sharing notifications and share requests (draft-pot-webdav-resource-sharing).
//!
//! The server files share invitations and replies as resources in the
//! principal's notification collection. Invitations are answered with an
//! `invite-reply` POSTed to the notification, and collections are shared by
//! POSTing a `share-resource` document to them.

use std::fmt;

use crate::dav::kind::NS_DAV;
use crate::dav::multistatus::{find_prop, response_href};
use crate::webdav::xml::XmlElement;

/// Content type of `invite-reply` and `share-resource` bodies.
pub const SHARING_CONTENT_TYPE: &str = "application/davsharing+xml; charset=utf-8";

/// Kind of a notification resource (first child of `notificationtype`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    ShareInvite,
    ShareReply,
    Other(String),
}

impl NotificationType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "share-invite-notification" => Self::ShareInvite,
            "share-reply-notification" => Self::ShareReply,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ShareInvite => "share-invite-notification",
            Self::ShareReply => "share-reply-notification",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a share invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteStatus {
    NoResponse,
    Accepted,
    Declined,
    Invalid,
    Deleted,
}

impl InviteStatus {
    pub const ALL: [InviteStatus; 5] = [
        Self::NoResponse,
        Self::Accepted,
        Self::Declined,
        Self::Invalid,
        Self::Deleted,
    ];

    pub fn element_name(self) -> &'static str {
        match self {
            Self::NoResponse => "invite-noresponse",
            Self::Accepted => "invite-accepted",
            Self::Declined => "invite-declined",
            Self::Invalid => "invite-invalid",
            Self::Deleted => "invite-deleted",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.element_name() == name)
    }
}

/// Access level granted to a sharee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAccess {
    Read,
    ReadWrite,
    /// Revokes a previous share.
    NoAccess,
}

impl ShareAccess {
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::ReadWrite => "read-write",
            Self::NoAccess => "no-access",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "read" => Some(Self::Read),
            "read-write" => Some(Self::ReadWrite),
            "no-access" => Some(Self::NoAccess),
            _ => None,
        }
    }
}

/// One entry of the notification collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Location relative to the configured root.
    pub href: String,
    pub notification_type: Option<NotificationType>,
    pub access: Option<ShareAccess>,
    pub status: Option<InviteStatus>,
    /// Organizer (invitations) or replying principal (replies).
    pub principal: Option<String>,
}

impl Notification {
    /// Parse a `notification` document fetched from `href`.
    pub fn from_element(element: &XmlElement, href: impl Into<String>) -> Self {
        let access = element
            .first_descendant("access")
            .or_else(|| element.first_descendant("share-access"))
            .and_then(XmlElement::first_child_element)
            .and_then(|el| ShareAccess::from_element_name(el.local_name()));

        let status = InviteStatus::ALL
            .into_iter()
            .rev()
            .find(|s| element.first_descendant(s.element_name()).is_some());

        let principal = element
            .first_descendant("organizer")
            .or_else(|| element.first_descendant("principal"))
            .and_then(|el| el.first_descendant("href"))
            .map(|href| href.text_content().trim().to_string())
            .filter(|href| !href.is_empty());

        Self {
            href: href.into(),
            notification_type: notification_type_of(element),
            access,
            status,
            principal,
        }
    }

    /// Listing entry from a notification collection `PROPFIND`.
    ///
    /// `None` for responses without a `notificationtype` (the collection itself).
    pub fn from_response(response: &XmlElement) -> Option<Self> {
        let notification_type = find_prop(response, "notificationtype")
            .and_then(XmlElement::first_child_element)
            .map(|el| NotificationType::from_name(el.local_name()))?;
        Some(Self {
            href: response_href(response).unwrap_or_default(),
            notification_type: Some(notification_type),
            ..Self::default()
        })
    }
}

/// Type from an embedded `notificationtype`, else from a `*-notification` child.
fn notification_type_of(element: &XmlElement) -> Option<NotificationType> {
    element
        .first_descendant("notificationtype")
        .and_then(XmlElement::first_child_element)
        .or_else(|| {
            element
                .child_elements()
                .find(|el| el.local_name().ends_with("-notification"))
        })
        .map(|el| NotificationType::from_name(el.local_name()))
}

/// `PROPFIND` body listing notifications. `allprop` would omit `notificationtype`.
pub fn build_notification_propfind_body() -> XmlElement {
    XmlElement::new("d:propfind")
        .attr("xmlns:d", NS_DAV)
        .child(XmlElement::new("d:prop").child(XmlElement::new("d:notificationtype")))
}

/// Answer to a share invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteReply {
    pub accept: bool,
    /// Collection under which the shared resource should appear.
    pub create_in: Option<String>,
    pub comment: Option<String>,
}

impl InviteReply {
    pub fn accept() -> Self {
        Self {
            accept: true,
            create_in: None,
            comment: None,
        }
    }

    pub fn decline() -> Self {
        Self {
            accept: false,
            ..Self::accept()
        }
    }

    pub fn status(&self) -> InviteStatus {
        if self.accept {
            InviteStatus::Accepted
        } else {
            InviteStatus::Declined
        }
    }

    /// `create_in` must already be a server path.
    pub fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("d:invite-reply")
            .attr("xmlns:d", NS_DAV)
            .child(XmlElement::new(format!("d:{}", self.status().element_name())));
        if let Some(create_in) = &self.create_in {
            root.push(XmlElement::new("d:create-in").child(XmlElement::new("d:href").text(create_in)));
        }
        if let Some(comment) = &self.comment {
            root.push(XmlElement::new("d:comment").text(comment));
        }
        root
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sharee {
    /// Principal href or `mailto:` URI.
    pub href: String,
    pub access: ShareAccess,
    pub comment: Option<String>,
}

/// Set of sharing changes for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareResource {
    /// Shared collection, relative to the configured root.
    pub href: String,
    pub sharees: Vec<Sharee>,
}

impl ShareResource {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            sharees: Vec::new(),
        }
    }

    pub fn sharee(mut self, href: impl Into<String>, access: ShareAccess) -> Self {
        self.sharees.push(Sharee {
            href: href.into(),
            access,
            comment: None,
        });
        self
    }

    pub fn to_xml(&self) -> XmlElement {
        XmlElement::new("d:share-resource")
            .attr("xmlns:d", NS_DAV)
            .children(self.sharees.iter().map(|sharee| {
                let mut el = XmlElement::new("d:sharee")
                    .child(XmlElement::new("d:href").text(&sharee.href));
                if let Some(comment) = &sharee.comment {
                    el.push(XmlElement::new("d:comment").text(comment));
                }
                el.child(
                    XmlElement::new("d:share-access")
                        .child(XmlElement::new(format!("d:{}", sharee.access.element_name()))),
                )
            }))
    }
}
