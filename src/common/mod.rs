pub mod compression;
pub mod http;

pub use compression::{ContentEncoding, add_accept_encoding, read_body, response_encodings};
pub use http::{HyperClient, build_hyper_client};
