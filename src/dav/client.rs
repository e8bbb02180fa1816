use bytes::Bytes;
use hyper::{HeaderMap, header};
use tokio::time::Duration;
use tracing::{debug, error};

use crate::config::DavConfig;
use crate::dav::discovery::{
    Discovery, DiscoveryResult, DiscoveryState, resolve_notification_home,
};
use crate::dav::folder::{Folder, build_folder_propfind_body};
use crate::dav::kind::ComponentKind;
use crate::dav::multistatus::response_ok;
use crate::dav::notification::{
    InviteReply, Notification, NotificationType, SHARING_CONTENT_TYPE, ShareResource,
    build_notification_propfind_body,
};
use crate::dav::object::{CommonObject, DavObject};
use crate::dav::report::{build_multiget_body, build_search_body};
use crate::error::{DavError, Result};
use crate::webdav::transport::Transport;
use crate::webdav::types::{DavResponse, Depth, ResponseBody};
use crate::webdav::xml::XmlElement;

/// CalDAV/CardDAV client for one account.
///
/// Features:
/// - Two-step discovery of calendar and address book homes
/// - Folder listing, creation, update and deletion
/// - Object create/update/delete with ETag capture
/// - Search (`*-query`) and fetch (`*-multiget`) reports
/// - Share notifications, invite replies and share requests
///
/// Every operation awaits its exchanges one after another and never retries.
/// Hrefs handed out by the client are relative to the base URI; hrefs passed
/// in may be relative or server-absolute.
#[derive(Debug)]
pub struct DavClient {
    transport: Transport,
}

impl DavClient {
    /// Create a client from a **base URL** and **Basic** credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL is not an absolute URI
    /// - The credentials cannot form a header value
    ///
    /// # Example
    /// ```no_run
    /// use groupware_dav::DavClient;
    /// use anyhow::Result;
    ///
    /// # fn example() -> Result<()> {
    /// let client = DavClient::new("https://dav.example/dav/", "jdoe", "secret")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(base_url, Some(username), Some(password))?,
        })
    }

    pub fn from_config(config: &DavConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::from_config(config)?,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Toggle request/response dumps on [`crate::webdav::WIRE_LOG_TARGET`].
    pub fn set_debug(&mut self, enabled: bool) {
        self.transport.set_debug(enabled);
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    /// Headers of the last successful exchange. Diagnostic only.
    pub fn last_response_headers(&self) -> HeaderMap {
        self.transport.last_response_headers()
    }

    /// Principal href for another user of the same server.
    pub fn principal_location(&self, email: &str) -> String {
        format!("{}principals/user/{email}", self.transport.root_path())
    }

    // ----------- Discovery -----------

    /// Discover the principal and home collection for `kind`.
    ///
    /// Returns `Ok(None)` when the server answers but lacks the principal or
    /// home-set property; transport and parse failures are errors.
    ///
    /// # Example
    /// ```no_run
    /// use groupware_dav::{ComponentKind, DavClient};
    ///
    /// # async fn example(client: &DavClient) -> anyhow::Result<()> {
    /// if let Some(found) = client.discover(ComponentKind::Event).await? {
    ///     println!("calendars live under {}", found.home_href);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn discover(&self, kind: ComponentKind) -> Result<Option<DiscoveryResult>> {
        Discovery::new(&self.transport, kind).run().await
    }

    /// True when event discovery completes against the server.
    pub async fn healthcheck(&self) -> Result<bool> {
        Ok(self.discover(ComponentKind::Event).await?.is_some())
    }

    /// DAV capability tokens advertised by the server (`DAV` header).
    pub async fn options(&self) -> Result<Vec<String>> {
        let response = self.transport.options("").await?;
        Ok(dav_capabilities(&response.headers))
    }

    // ----------- Folders -----------

    /// Folders under the discovered home that hold objects of `kind`.
    ///
    /// `Ok(None)` when discovery finds no home.
    pub async fn list_folders(&self, kind: ComponentKind) -> Result<Option<Vec<Folder>>> {
        let Some(home) = self.discover(kind).await? else {
            return Ok(None);
        };

        // some CardDAV servers only list children with an explicit Depth: 1
        let response = self
            .transport
            .propfind(&home.home_href, Depth::One, &build_folder_propfind_body(Some(kind)))
            .await
            .inspect_err(|err| error!(%kind, %err, "failed to list folders"))?;

        let folders: Vec<Folder> = response
            .body
            .responses()
            .into_iter()
            .map(|r| self.folder_from_response(r))
            .filter(|folder| folder.supports(kind))
            .collect();
        debug!(%kind, count = folders.len(), "listed folders");
        Ok(Some(folders))
    }

    /// Metadata of a single folder, `None` when the server describes nothing.
    pub async fn folder_info(&self, href: &str) -> Result<Option<Folder>> {
        let response = self
            .transport
            .propfind(href, Depth::Zero, &build_folder_propfind_body(None))
            .await?;
        Ok(response
            .body
            .responses()
            .first()
            .map(|r| self.folder_from_response(r)))
    }

    /// `MKCOL` at `folder.href`.
    pub async fn folder_create(&self, folder: &Folder) -> Result<()> {
        self.transport
            .mkcol(&folder.href, &folder.to_mkcol_xml())
            .await?;
        Ok(())
    }

    /// `PROPPATCH` of the folder's mutable properties.
    pub async fn folder_update(&self, folder: &Folder) -> Result<()> {
        self.transport
            .proppatch(&folder.href, &folder.to_proppatch_xml())
            .await?;
        Ok(())
    }

    pub async fn folder_delete(&self, href: &str) -> Result<()> {
        self.transport.delete(href).await?;
        Ok(())
    }

    fn folder_from_response(&self, response: &XmlElement) -> Folder {
        let mut folder = Folder::from_response(response);
        folder.href = self.transport.relativize(&folder.href);
        folder
    }

    // ----------- Objects -----------

    /// Store `object` at its href and record the returned ETag.
    ///
    /// The object is only modified on success. Empty payloads are rejected
    /// before anything is sent.
    ///
    /// # Example
    /// ```no_run
    /// use groupware_dav::{CommonObject, DavClient, Event};
    ///
    /// # async fn example(client: &DavClient) -> anyhow::Result<()> {
    /// let mut event = Event::new(
    ///     "calendars/jdoe/personal/meeting.ics",
    ///     "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n",
    /// );
    /// client.create(&mut event).await?;
    /// println!("stored with etag {:?}", event.etag());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create<O: CommonObject>(&self, object: &mut O) -> Result<()> {
        let body = object.serialize();
        if body.is_empty() {
            return Err(DavError::EmptyObject(object.href().to_string()));
        }

        let response = self
            .transport
            .put(object.href(), object.content_type(), body)
            .await?;

        if let Some(etag) = response.etag() {
            object.object_mut().set_etag(etag);
        }
        Ok(())
    }

    /// Same as [`DavClient::create`]: `PUT` replaces whatever is stored at the href.
    pub async fn update<O: CommonObject>(&self, object: &mut O) -> Result<()> {
        self.create(object).await
    }

    pub async fn delete(&self, href: &str) -> Result<()> {
        self.transport.delete(href).await?;
        Ok(())
    }

    /// Hrefs and ETags of the objects of `kind` in a folder.
    ///
    /// Calendar searches filter on `component_filter`, defaulting to the
    /// kind's own component. Payloads are not included; use
    /// [`DavClient::get_objects`] to fetch them.
    pub async fn search(
        &self,
        folder_href: &str,
        kind: ComponentKind,
        component_filter: Option<&str>,
    ) -> Result<Vec<DavObject>> {
        let body = build_search_body(kind, component_filter);
        let response = self
            .transport
            .report(folder_href, Depth::One, &body)
            .await
            .inspect_err(|err| error!(%kind, folder_href, %err, "failed to search objects"))?;
        Ok(self.objects_from_response(kind, &response))
    }

    /// Fetch the given objects with their payloads in one multiget.
    ///
    /// An empty `hrefs` returns an empty list without contacting the server.
    pub async fn get_objects<S: AsRef<str>>(
        &self,
        folder_href: &str,
        kind: ComponentKind,
        hrefs: &[S],
    ) -> Result<Vec<DavObject>> {
        let absolute: Vec<String> = hrefs
            .iter()
            .map(|h| h.as_ref().trim())
            .filter(|h| !h.is_empty())
            .map(|h| self.transport.absolutize(h))
            .collect();
        let Some(body) = build_multiget_body(kind, &absolute) else {
            return Ok(Vec::new());
        };

        let response = self
            .transport
            .report(folder_href, Depth::One, &body)
            .await
            .inspect_err(|err| error!(%kind, folder_href, %err, "failed to fetch objects"))?;
        Ok(self.objects_from_response(kind, &response))
    }

    fn objects_from_response(&self, kind: ComponentKind, response: &DavResponse) -> Vec<DavObject> {
        response
            .body
            .responses()
            .into_iter()
            .filter(|r| response_ok(r))
            .map(|r| {
                let mut object = kind.object_from_response(r);
                let href = self.transport.relativize(object.href());
                object.object_mut().set_href(href);
                object
            })
            .collect()
    }

    // ----------- Sharing -----------

    /// Notification collection of the current principal.
    ///
    /// `Ok(None)` when the principal cannot be resolved or advertises no
    /// `notification-URL`.
    pub async fn notification_home(&self) -> Result<Option<String>> {
        let mut discovery = Discovery::new(&self.transport, ComponentKind::Event);
        let principal_href = match discovery.step().await? {
            DiscoveryState::PrincipalResolved { principal_href } => principal_href.clone(),
            _ => return Ok(None),
        };
        resolve_notification_home(&self.transport, &principal_href).await
    }

    /// Notifications of the given types (all types when `types` is empty).
    ///
    /// Each matching entry is fetched with its own `GET`; entries whose body
    /// holds no `notification` are skipped.
    ///
    /// # Example
    /// ```no_run
    /// use groupware_dav::{DavClient, InviteReply, InviteStatus, NotificationType};
    ///
    /// # async fn example(client: &DavClient) -> anyhow::Result<()> {
    /// for invite in client.list_notifications(&[NotificationType::ShareInvite]).await? {
    ///     if invite.status == Some(InviteStatus::NoResponse) {
    ///         client.invite_reply(&invite.href, &InviteReply::accept()).await?;
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_notifications(&self, types: &[NotificationType]) -> Result<Vec<Notification>> {
        let Some(home) = self.notification_home().await? else {
            return Ok(Vec::new());
        };

        let response = self
            .transport
            .propfind(&home, Depth::One, &build_notification_propfind_body())
            .await
            .inspect_err(|err| error!(%home, %err, "failed to list notifications"))?;

        let wanted: Vec<Notification> = response
            .body
            .responses()
            .into_iter()
            .filter_map(Notification::from_response)
            .filter(|n| {
                types.is_empty()
                    || n.notification_type.as_ref().is_some_and(|t| types.contains(t))
            })
            .filter(|n| !n.href.is_empty())
            .collect();

        let mut notifications = Vec::with_capacity(wanted.len());
        for listed in wanted {
            if let Some(mut notification) = self.get_notification(&listed.href).await? {
                if notification.notification_type.is_none() {
                    notification.notification_type = listed.notification_type;
                }
                notifications.push(notification);
            }
        }
        debug!(count = notifications.len(), "listed notifications");
        Ok(notifications)
    }

    /// Fetch and parse one notification resource.
    pub async fn get_notification(&self, href: &str) -> Result<Option<Notification>> {
        let response = self.transport.get(href).await?;
        let root = match response.body {
            ResponseBody::Xml(root) => root,
            ResponseBody::Opaque(raw) if raw.trim_ascii().is_empty() => return Ok(None),
            ResponseBody::Opaque(raw) => XmlElement::parse(&raw)?,
        };

        let element = if root.is("notification") {
            Some(&root)
        } else {
            root.first_descendant("notification")
        };
        Ok(element.map(|el| Notification::from_element(el, self.transport.relativize(href))))
    }

    /// Accept or decline the invitation at `notification_href`.
    pub async fn invite_reply(&self, notification_href: &str, reply: &InviteReply) -> Result<()> {
        let mut reply = reply.clone();
        reply.create_in = reply.create_in.map(|href| self.transport.absolutize(&href));
        self.transport
            .post(
                notification_href,
                SHARING_CONTENT_TYPE,
                Bytes::from(reply.to_xml().to_document()),
            )
            .await?;
        Ok(())
    }

    /// Grant, change or revoke access to a collection.
    ///
    /// # Example
    /// ```no_run
    /// use groupware_dav::{DavClient, ShareAccess, ShareResource};
    ///
    /// # async fn example(client: &DavClient) -> anyhow::Result<()> {
    /// let share = ShareResource::new("calendars/jdoe/personal/")
    ///     .sharee(client.principal_location("alice@example.org"), ShareAccess::Read);
    /// client.share_resource(&share).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn share_resource(&self, resource: &ShareResource) -> Result<()> {
        self.transport
            .post(
                &resource.href,
                SHARING_CONTENT_TYPE,
                Bytes::from(resource.to_xml().to_document()),
            )
            .await?;
        Ok(())
    }
}

/// Capability tokens of every `DAV` header, comma-split and trimmed.
pub fn dav_capabilities(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::HeaderName::from_static("dav"))
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
