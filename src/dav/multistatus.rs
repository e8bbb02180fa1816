//! Helpers over `207 Multi-Status` `response` elements.

use crate::webdav::xml::XmlElement;

/// Status code of a `DAV:status` line such as `HTTP/1.1 404 Not Found`.
pub fn status_code(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}

fn is_success_status(element: Option<&XmlElement>) -> bool {
    match element.map(|status| status_code(status.text_content().trim())) {
        None => true,
        Some(Some(code)) => (200..300).contains(&code),
        Some(None) => false,
    }
}

/// The `href` naming the resource a response describes.
pub fn response_href(response: &XmlElement) -> Option<String> {
    response
        .child_elements()
        .find(|el| el.is("href"))
        .map(|href| href.text_content().trim().to_string())
        .filter(|href| !href.is_empty())
}

/// False when the response carries a non-2xx response-level status
/// (e.g. a multiget entry for a missing resource).
pub fn response_ok(response: &XmlElement) -> bool {
    is_success_status(response.child_elements().find(|el| el.is("status")))
}

/// `prop` elements of the response whose `propstat` reports success.
///
/// Properties reported as 404 by servers that ignore `Prefer: return-minimal`
/// are skipped.
pub fn ok_props(response: &XmlElement) -> Vec<&XmlElement> {
    response
        .child_elements()
        .filter(|el| el.is("propstat"))
        .filter(|propstat| is_success_status(propstat.child_elements().find(|el| el.is("status"))))
        .flat_map(|propstat| propstat.child_elements().filter(|el| el.is("prop")))
        .collect()
}

/// First successfully reported property with the given local name.
pub fn find_prop<'a>(response: &'a XmlElement, local: &str) -> Option<&'a XmlElement> {
    ok_props(response)
        .into_iter()
        .find_map(|prop| prop.child_elements().find(|el| el.is(local)))
}

/// Trimmed, non-empty text of a property.
pub fn prop_text(response: &XmlElement, local: &str) -> Option<String> {
    find_prop(response, local)
        .map(|el| el.text_content().trim().to_string())
        .filter(|text| !text.is_empty())
}
