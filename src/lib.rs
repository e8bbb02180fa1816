//! CalDAV/CardDAV client for groupware provisioning.
//!
//! This library talks to a calendar and contact server over WebDAV: it
//! discovers a user's collection homes, manages folders (collections) and
//! stores, searches and fetches calendar, task and contact objects. It is
//! built on hyper 1.x, rustls and tokio.
//!
//! # Features
//!
//! - Two-step discovery (principal, then home set) per component kind
//! - Folder listing, creation, update and deletion with color and alarm metadata
//! - Object create/update/delete with ETag capture
//! - Search and multiget reports
//! - Share invitations: notification listing, invite replies and share requests
//! - Automatic response decompression (br/zstd/gzip)
//! - Optional request/response dumps through `tracing`
//!
//! Hrefs returned by the client are relative to the configured base URI.
//! Operations never retry; a failed exchange ends the operation with a
//! [`DavError`].
//!
//! # Examples
//!
//! ## Discovery and folder listing
//!
//! ```no_run
//! use groupware_dav::{ComponentKind, DavClient};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = DavClient::new("https://dav.example/dav/", "jdoe", "secret")?;
//!
//!     match client.list_folders(ComponentKind::Event).await? {
//!         Some(folders) => {
//!             for folder in &folders {
//!                 println!("{} ({:?})", folder.href, folder.display_name);
//!             }
//!         }
//!         None => println!("no calendar home for this account"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Folders and objects
//!
//! ```no_run
//! use groupware_dav::{CommonObject, ComponentKind, Contact, DavClient, Folder};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = DavClient::new("https://dav.example/dav/", "jdoe", "secret")?;
//!
//!     let folder = Folder::addressbook("addressbooks/jdoe/work/", "Work");
//!     client.folder_create(&folder).await?;
//!
//!     let mut contact = Contact::new(
//!         "addressbooks/jdoe/work/alice.vcf",
//!         "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Alice\r\nEND:VCARD\r\n",
//!     );
//!     client.create(&mut contact).await?;
//!
//!     let found = client
//!         .search(&folder.href, ComponentKind::Contact, None)
//!         .await?;
//!     let hrefs: Vec<&str> = found.iter().map(|o| o.href()).collect();
//!     for object in client.get_objects(&folder.href, ComponentKind::Contact, &hrefs).await? {
//!         println!("{} => {:?}", object.href(), object.etag());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## From configuration
//!
//! ```no_run
//! use groupware_dav::{DavClient, DavConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut config = DavConfig::new("https://dav.example/dav/", "jdoe", "secret");
//! config.debug = true;
//! let client = DavClient::from_config(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod dav;
pub mod error;
pub mod webdav;

pub use config::DavConfig;
pub use dav::{
    CommonObject, ComponentKind, Contact, DavClient, DavObject, DiscoveryResult, Event, Folder,
    InviteReply, InviteStatus, Notification, NotificationType, ShareAccess, ShareResource, Task,
};
pub use error::{DavError, Result};
pub use webdav::{Depth, XmlElement};
