//! Folders (calendar and address book collections) and their XML forms.

use crate::dav::kind::{
    ComponentKind, NS_APPLE_ICAL, NS_CALDAV, NS_CALENDARSERVER, NS_CARDDAV, NS_DAV, NS_KOLAB,
};
use crate::dav::multistatus::{find_prop, prop_text, response_href};
use crate::webdav::xml::XmlElement;

/// Metadata of one DAV collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    /// Location relative to the configured root.
    pub href: String,
    pub display_name: Option<String>,
    /// Collection change token (`getctag`).
    pub ctag: Option<String>,
    /// Component names from `supported-calendar-component-set` (`VEVENT`, `VTODO`, ...).
    pub components: Vec<String>,
    /// Local names of the `resourcetype` children (`collection`, `calendar`, `addressbook`).
    pub resource_types: Vec<String>,
    /// Color as 6 to 8 hex digits (`RRGGBB`, `RRGGBBAA`), without `#`.
    pub color: Option<String>,
    pub alarms: Option<bool>,
}

impl Folder {
    /// Calendar collection supporting the given kinds.
    pub fn calendar(href: impl Into<String>, name: impl Into<String>, kinds: &[ComponentKind]) -> Self {
        Self {
            href: href.into(),
            display_name: Some(name.into()),
            components: kinds
                .iter()
                .filter(|kind| kind.is_calendar())
                .map(|kind| kind.component_name().to_string())
                .collect(),
            resource_types: vec!["collection".into(), "calendar".into()],
            ..Self::default()
        }
    }

    pub fn addressbook(href: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            display_name: Some(name.into()),
            resource_types: vec!["collection".into(), "addressbook".into()],
            ..Self::default()
        }
    }

    pub fn has_resource_type(&self, resource_type: &str) -> bool {
        self.resource_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(resource_type))
    }

    /// Whether objects of `kind` belong in this folder.
    ///
    /// Address books do not advertise a component set, so contacts are matched
    /// on the resource type.
    pub fn supports(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Contact => self.has_resource_type(kind.resource_type()),
            ComponentKind::Event | ComponentKind::Task => self
                .components
                .iter()
                .any(|c| c.eq_ignore_ascii_case(kind.component_name())),
        }
    }

    /// Build a folder from a multistatus `response` element. The href is kept
    /// as sent by the server.
    pub fn from_response(response: &XmlElement) -> Self {
        let mut folder = Folder {
            href: response_href(response).unwrap_or_default(),
            display_name: prop_text(response, "displayname"),
            ctag: prop_text(response, "getctag"),
            color: prop_text(response, "calendar-color").and_then(|c| parse_color(&c)),
            alarms: prop_text(response, "alarms").and_then(|a| parse_flag(&a)),
            ..Folder::default()
        };

        if let Some(set) = find_prop(response, "supported-calendar-component-set") {
            folder.components = set
                .descendants("comp")
                .into_iter()
                .filter_map(|comp| comp.attribute("name"))
                .map(str::to_string)
                .collect();
        }

        if let Some(types) = find_prop(response, "resourcetype") {
            folder.resource_types = types
                .child_elements()
                .map(|t| t.local_name().to_string())
                .collect();
        }

        folder
    }

    /// `MKCOL` body: resource type plus all metadata.
    pub fn to_mkcol_xml(&self) -> XmlElement {
        self.to_xml("d:mkcol", true)
    }

    /// `PROPPATCH` body: mutable metadata only.
    ///
    /// The resource type and component set are fixed at creation.
    pub fn to_proppatch_xml(&self) -> XmlElement {
        self.to_xml("d:propertyupdate", false)
    }

    fn to_xml(&self, root: &str, creating: bool) -> XmlElement {
        let mut namespaces = vec![("xmlns:d", NS_DAV)];
        let mut prop = XmlElement::new("d:prop");

        if creating {
            let mut resourcetype = XmlElement::new("d:resourcetype").child(XmlElement::new("d:collection"));
            if self.has_resource_type("addressbook") {
                namespaces.push(("xmlns:c", NS_CARDDAV));
                resourcetype.push(XmlElement::new("c:addressbook"));
            } else if self.has_resource_type("calendar") {
                namespaces.push(("xmlns:c", NS_CALDAV));
                resourcetype.push(XmlElement::new("c:calendar"));
            }
            prop.push(resourcetype);

            if self.has_resource_type("calendar") && !self.components.is_empty() {
                prop.push(
                    XmlElement::new("c:supported-calendar-component-set").children(
                        self.components
                            .iter()
                            .map(|name| XmlElement::new("c:comp").attr("name", name.as_str())),
                    ),
                );
            }
        }

        if let Some(name) = &self.display_name {
            prop.push(XmlElement::new("d:displayname").text(name.as_str()));
        }

        if let Some(color) = &self.color {
            namespaces.push(("xmlns:a", NS_APPLE_ICAL));
            let color = if color.starts_with('#') || color.is_empty() {
                color.clone()
            } else {
                format!("#{color}")
            };
            prop.push(XmlElement::new("a:calendar-color").text(color));
        }

        if let Some(alarms) = self.alarms {
            namespaces.push(("xmlns:k", NS_KOLAB));
            prop.push(XmlElement::new("k:alarms").text(if alarms { "true" } else { "false" }));
        }

        let mut root = XmlElement::new(root);
        for (key, uri) in namespaces {
            root = root.attr(key, uri);
        }
        root.child(XmlElement::new("d:set").child(prop))
    }
}

/// `PROPFIND` body listing folder metadata.
///
/// Calendar-only properties are requested unless `kind` is [`ComponentKind::Contact`];
/// `None` asks for the full set.
pub fn build_folder_propfind_body(kind: Option<ComponentKind>) -> XmlElement {
    let calendar = kind.is_none_or(ComponentKind::is_calendar);

    let mut root = XmlElement::new("d:propfind")
        .attr("xmlns:d", NS_DAV)
        .attr("xmlns:cs", NS_CALENDARSERVER);
    let mut prop = XmlElement::new("d:prop")
        .child(XmlElement::new("d:resourcetype"))
        .child(XmlElement::new("d:displayname"))
        .child(XmlElement::new("cs:getctag"));

    if calendar {
        root = root
            .attr("xmlns:c", NS_CALDAV)
            .attr("xmlns:a", NS_APPLE_ICAL)
            .attr("xmlns:k", NS_KOLAB);
        prop = prop
            .child(XmlElement::new("c:supported-calendar-component-set"))
            .child(XmlElement::new("a:calendar-color"))
            .child(XmlElement::new("k:alarms"));
    }

    root.child(prop)
}

/// Accept `#` followed by 6 to 8 hex digits and drop the `#`.
fn parse_color(value: &str) -> Option<String> {
    let hex = value.strip_prefix('#')?;
    ((6..=8).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| hex.to_string())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
