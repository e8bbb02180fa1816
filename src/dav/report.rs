//! `REPORT` bodies for object search (`*-query`) and fetch (`*-multiget`).

use crate::dav::kind::{ComponentKind, NS_DAV};
use crate::webdav::xml::XmlElement;

fn report_root(kind: ComponentKind, report: &str) -> XmlElement {
    XmlElement::new(format!("c:{report}"))
        .attr("xmlns:d", NS_DAV)
        .attr("xmlns:c", kind.namespace())
}

/// Query body returning the href and etag of every matching object.
///
/// Calendar queries always carry a `VCALENDAR` comp-filter wrapping
/// `component_filter` (the kind's own component when `None`). Address book
/// queries never carry a filter.
pub fn build_search_body(kind: ComponentKind, component_filter: Option<&str>) -> XmlElement {
    let root = report_root(kind, kind.query_report())
        .child(XmlElement::new("d:prop").child(XmlElement::new("d:getetag")));

    if !kind.is_calendar() {
        return root;
    }

    let component = component_filter.unwrap_or(kind.component_name());
    root.child(
        XmlElement::new("c:filter").child(
            XmlElement::new("c:comp-filter")
                .attr("name", "VCALENDAR")
                .child(XmlElement::new("c:comp-filter").attr("name", component)),
        ),
    )
}

/// Multiget body fetching etag and payload of the given objects.
///
/// `hrefs` must already be server paths. Returns `None` when there is
/// nothing to fetch.
pub fn build_multiget_body<S: AsRef<str>>(kind: ComponentKind, hrefs: &[S]) -> Option<XmlElement> {
    let hrefs: Vec<&str> = hrefs
        .iter()
        .map(|h| h.as_ref().trim())
        .filter(|h| !h.is_empty())
        .collect();
    if hrefs.is_empty() {
        return None;
    }

    let prop = XmlElement::new("d:prop")
        .child(XmlElement::new("d:getetag"))
        .child(XmlElement::new(format!("c:{}", kind.data_element())));

    Some(
        report_root(kind, kind.multiget_report())
            .child(prop)
            .children(hrefs.into_iter().map(|h| XmlElement::new("d:href").text(h))),
    )
}
