pub mod transport;
pub mod types;
pub mod xml;

pub use transport::{Transport, WIRE_LOG_TARGET, render_exchange};
pub use types::{DavResponse, Depth, ResponseBody, etag_from_headers, strip_etag_quotes};
pub use xml::{XML_DECLARATION, XmlElement, XmlNode, escape_xml, has_xml_declaration};
