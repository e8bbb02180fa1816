pub mod client;
pub mod discovery;
pub mod folder;
pub mod kind;
pub mod multistatus;
pub mod notification;
pub mod object;
pub mod report;

pub use client::{DavClient, dav_capabilities};
pub use discovery::{
    Discovery, DiscoveryResult, DiscoveryState, DiscoveryStep, build_home_set_body,
    build_notification_url_body, build_principal_body, resolve_notification_home,
};
pub use folder::{Folder, build_folder_propfind_body};
pub use kind::{
    ComponentKind, NS_APPLE_ICAL, NS_CALDAV, NS_CALENDARSERVER, NS_CARDDAV, NS_DAV, NS_KOLAB,
};
pub use notification::{
    InviteReply, InviteStatus, Notification, NotificationType, SHARING_CONTENT_TYPE,
    ShareAccess, ShareResource, Sharee, build_notification_propfind_body,
};
pub use object::{CommonObject, Contact, DavObject, Event, ObjectData, Task};
pub use report::{build_multiget_body, build_search_body};
