//! Two-step collection discovery: principal, then home set.
//!
//! ```text
//! Init --PROPFIND current-user-principal--> PrincipalResolved
//!      --PROPFIND <kind>-home-set---------> HomeResolved
//! either step without data ---------------> Failed
//! ```

use tracing::{debug, error, warn};

use crate::dav::kind::{ComponentKind, NS_DAV};
use crate::dav::multistatus::find_prop;
use crate::error::Result;
use crate::webdav::transport::Transport;
use crate::webdav::types::Depth;
use crate::webdav::xml::XmlElement;

/// Outcome of a successful handshake. Both hrefs are relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub principal_href: String,
    pub home_href: String,
}

/// Step at which discovery found no usable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStep {
    Principal,
    HomeSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryState {
    Init,
    PrincipalResolved { principal_href: String },
    HomeResolved(DiscoveryResult),
    Failed(DiscoveryStep),
}

impl DiscoveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::HomeResolved(_) | Self::Failed(_))
    }
}

/// `PROPFIND` body asking for `current-user-principal`.
pub fn build_principal_body() -> XmlElement {
    XmlElement::new("d:propfind").attr("xmlns:d", NS_DAV).child(
        XmlElement::new("d:prop").child(XmlElement::new("d:current-user-principal")),
    )
}

/// `PROPFIND` body asking for the kind's home-set property.
pub fn build_home_set_body(kind: ComponentKind) -> XmlElement {
    XmlElement::new("d:propfind")
        .attr("xmlns:d", NS_DAV)
        .attr("xmlns:c", kind.namespace())
        .child(
            XmlElement::new("d:prop")
                .child(XmlElement::new(format!("c:{}", kind.home_set_property()))),
        )
}

/// `PROPFIND` body asking for the principal's `notification-URL`.
pub fn build_notification_url_body() -> XmlElement {
    XmlElement::new("d:propfind")
        .attr("xmlns:d", NS_DAV)
        .child(XmlElement::new("d:prop").child(XmlElement::new("d:notification-URL")))
}

/// Notification collection of a principal, relative to the root.
///
/// `None` when the server does not advertise one.
pub async fn resolve_notification_home(
    transport: &Transport,
    principal_href: &str,
) -> Result<Option<String>> {
    let response = transport
        .propfind(principal_href, Depth::Zero, &build_notification_url_body())
        .await?;

    let home = response
        .body
        .responses()
        .into_iter()
        .next()
        .and_then(|r| find_prop(r, "notification-URL"))
        .and_then(first_href);

    match home {
        Some(home) => {
            let home = transport.relativize(&home);
            debug!(%principal_href, %home, "notification collection resolved");
            Ok(Some(home))
        }
        None => {
            debug!(%principal_href, "principal has no notification-URL");
            Ok(None)
        }
    }
}

/// One discovery run for a single kind.
///
/// Transport failures abort the run with an error; missing data moves it to
/// [`DiscoveryState::Failed`].
#[derive(Debug)]
pub struct Discovery<'a> {
    transport: &'a Transport,
    kind: ComponentKind,
    state: DiscoveryState,
}

impl<'a> Discovery<'a> {
    pub fn new(transport: &'a Transport, kind: ComponentKind) -> Self {
        Self {
            transport,
            kind,
            state: DiscoveryState::Init,
        }
    }

    pub fn state(&self) -> &DiscoveryState {
        &self.state
    }

    /// Advance by one exchange. Terminal states are left untouched.
    pub async fn step(&mut self) -> Result<&DiscoveryState> {
        let next = match &self.state {
            DiscoveryState::Init => Some(self.resolve_principal().await?),
            DiscoveryState::PrincipalResolved { principal_href } => {
                Some(self.resolve_home(principal_href).await?)
            }
            DiscoveryState::HomeResolved(_) | DiscoveryState::Failed(_) => None,
        };
        if let Some(next) = next {
            self.state = next;
        }
        Ok(&self.state)
    }

    /// Run to a terminal state; `None` when the server lacks the data.
    pub async fn run(mut self) -> Result<Option<DiscoveryResult>> {
        while !self.state.is_terminal() {
            self.step().await?;
        }
        match self.state {
            DiscoveryState::HomeResolved(result) => Ok(Some(result)),
            _ => Ok(None),
        }
    }

    async fn resolve_principal(&self) -> Result<DiscoveryState> {
        let root = format!("{}/", self.kind.root_segment());
        let response = self
            .transport
            .propfind(&root, Depth::One, &build_principal_body())
            .await?;

        let mut principals = response
            .body
            .responses()
            .into_iter()
            .filter_map(|r| find_prop(r, "current-user-principal"))
            .filter_map(first_href);

        let Some(principal) = principals.next() else {
            error!(kind = %self.kind, "principal discovery returned no current-user-principal");
            return Ok(DiscoveryState::Failed(DiscoveryStep::Principal));
        };
        if let Some(other) = principals.find(|p| *p != principal) {
            warn!(kind = %self.kind, %principal, %other, "server reported several principals, using the first");
        }

        let principal_href = self.transport.relativize(&principal);
        debug!(kind = %self.kind, %principal_href, "principal resolved");
        Ok(DiscoveryState::PrincipalResolved { principal_href })
    }

    async fn resolve_home(&self, principal_href: &str) -> Result<DiscoveryState> {
        let response = self
            .transport
            .propfind(principal_href, Depth::Zero, &build_home_set_body(self.kind))
            .await?;

        let home = response
            .body
            .responses()
            .into_iter()
            .next()
            .and_then(|r| find_prop(r, self.kind.home_set_property()))
            .and_then(first_href);

        let Some(home) = home else {
            error!(kind = %self.kind, %principal_href, "home-set discovery returned no {}", self.kind.home_set_property());
            return Ok(DiscoveryState::Failed(DiscoveryStep::HomeSet));
        };

        let home_href = self.transport.relativize(&home);
        debug!(kind = %self.kind, %home_href, "home set resolved");
        Ok(DiscoveryState::HomeResolved(DiscoveryResult {
            principal_href: principal_href.to_string(),
            home_href,
        }))
    }
}

fn first_href(prop: &XmlElement) -> Option<String> {
    prop.first_descendant("href")
        .map(|href| href.text_content().trim().to_string())
        .filter(|href| !href.is_empty())
}
