//! Hypermedia client: navigation and action invocation
//!
//! The client knows a single URL, the API root. Everything else is reached
//! by following relations advertised in `_links` and by invoking actions
//! declared in `_templates`.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = HalClient::new(ReqwestTransport::new()?, ClientConfig::new("http://localhost:8082/api"))?;
//!
//! let root = client.root().await?;
//! let teams = client
//!     .follow_one(&root, "teams", Some(&client.build_page_params(&PaginationOption::default())))
//!     .await?;
//!
//! if client.can_invoke(&teams, "createTeam") {
//!     let team = client.invoke_resource(&teams, "createTeam", &request).await?;
//! }
//! ```

mod root;

pub use root::RootState;

use crate::config::ClientConfig;
#[cfg(feature = "reqwest-transport")]
use crate::transport::ReqwestTransport;
use crate::core::error::{HalError, ProtocolError};
use crate::core::link::{Link, LinkValue};
use crate::core::query::{PaginationOption, QueryParams, build_page_params};
use crate::core::resource::Resource;
use crate::transport::{HttpRequest, HttpTransport, Method};
use futures::future::try_join_all;
use root::RootCell;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use url::Url;

/// Result of following a relation
#[derive(Debug, Clone, PartialEq)]
pub enum Followed {
    /// The relation held a single link
    One(Resource),

    /// The relation held an array of links, one resource per link in order
    Many(Vec<Resource>),
}

impl Followed {
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Followed::One(resource) => vec![resource],
            Followed::Many(resources) => resources,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Followed::One(_) => 1,
            Followed::Many(resources) => resources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
    base_url: Url,
    root: RootCell,
}

/// The hypermedia client
///
/// Cheap to clone; clones share the transport and the root resource.
#[derive(Clone)]
pub struct HalClient {
    inner: Arc<ClientInner>,
}

impl HalClient {
    /// Create a client and start fetching the root resource
    ///
    /// The root is fetched exactly once, on a task spawned here, so this
    /// must be called from within a Tokio runtime.
    pub fn new(transport: impl HttpTransport + 'static, config: ClientConfig) -> Result<Self, HalError> {
        Self::with_shared_transport(Arc::new(transport), config)
    }

    pub fn with_shared_transport(
        transport: Arc<dyn HttpTransport>,
        config: ClientConfig,
    ) -> Result<Self, HalError> {
        let base_url = config.root_url()?;
        tracing::debug!(
            base_url = %base_url,
            delay_ms = config.response_delay,
            "Initializing hypermedia client"
        );

        let root = {
            let transport = transport.clone();
            let request = HttpRequest::new(Method::Get, base_url.as_str()).header("Accept", config.accept.clone());
            let url = base_url.to_string();
            RootCell::spawn(url, async move {
                let body = transport.execute(request).await?;
                parse_body(body, "root resource")
            })
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                config,
                base_url,
                root,
            }),
        })
    }

    /// Client over a default [`ReqwestTransport`]
    #[cfg(feature = "reqwest-transport")]
    pub fn connect(config: ClientConfig) -> Result<Self, HalError> {
        let transport = ReqwestTransport::new().map_err(|e| HalError::Config(e.to_string()))?;
        Self::new(transport, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // =========================================================================
    // Root
    // =========================================================================

    /// The API root, or the latched error of its fetch
    pub async fn root(&self) -> Result<Arc<Resource>, HalError> {
        self.inner.root.get().await
    }

    /// Current state without waiting
    pub fn root_state(&self) -> RootState {
        self.inner.root.current()
    }

    /// Stream of root states, starting with the current one
    pub fn watch_root(&self) -> WatchStream<RootState> {
        WatchStream::new(self.inner.root.subscribe())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn has_link<T>(&self, resource: &Resource<T>, rel: &str) -> bool {
        resource.has_link(rel)
    }

    /// Follow a relation
    ///
    /// Fails without any request when `rel` is absent. A single link issues
    /// one GET; an array of links issues one GET per link concurrently and
    /// succeeds only when all of them do.
    pub async fn follow<T>(
        &self,
        resource: &Resource<T>,
        rel: &str,
        params: Option<&QueryParams>,
    ) -> Result<Followed, HalError> {
        let value = resource.require_link(rel)?;
        tracing::debug!(href = %resource.self_href(), rel = %rel, links = value.len(), "Following relation");

        let followed = match value {
            LinkValue::Single(link) => {
                let url = self.link_url(link, params)?;
                Followed::One(self.get(url).await?)
            }
            LinkValue::Many(links) => {
                let urls = links
                    .iter()
                    .map(|link| self.link_url(link, params))
                    .collect::<Result<Vec<_>, _>>()?;
                Followed::Many(try_join_all(urls.into_iter().map(|url| self.get(url))).await?)
            }
        };

        self.simulate_delay().await;
        Ok(followed)
    }

    /// Follow a relation that must hold a single link
    ///
    /// An array relation fails with [`ProtocolError::UnexpectedLinkArray`]
    /// before any request.
    pub async fn follow_one<T>(
        &self,
        resource: &Resource<T>,
        rel: &str,
        params: Option<&QueryParams>,
    ) -> Result<Resource, HalError> {
        if let LinkValue::Many(links) = resource.require_link(rel)? {
            return Err(ProtocolError::UnexpectedLinkArray {
                rel: rel.to_string(),
                count: links.len(),
            }
            .into());
        }

        match self.follow(resource, rel, params).await? {
            Followed::One(resource) => Ok(resource),
            Followed::Many(mut resources) => resources
                .pop()
                .ok_or_else(|| HalError::decode(rel.to_string(), "no resource returned")),
        }
    }

    /// Follow an optional relation
    ///
    /// A missing relation yields an empty list; request failures still propagate.
    pub async fn follow_optional<T>(
        &self,
        resource: &Resource<T>,
        rel: &str,
        params: Option<&QueryParams>,
    ) -> Result<Vec<Resource>, HalError> {
        if !resource.has_link(rel) {
            tracing::debug!(href = %resource.self_href(), rel = %rel, "Optional relation absent");
            return Ok(Vec::new());
        }
        Ok(self.follow(resource, rel, params).await?.into_vec())
    }

    /// GET a known URI
    pub async fn load_resource(&self, href: &str) -> Result<Resource, HalError> {
        tracing::debug!(href = %href, "Loading resource");
        let url = self.resolve(href)?;
        let resource = self.get(url).await?;
        self.simulate_delay().await;
        Ok(resource)
    }

    /// Query parameters for a pagination option
    pub fn build_page_params(&self, option: &PaginationOption) -> QueryParams {
        build_page_params(option)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn can_invoke<T>(&self, resource: &Resource<T>, action: &str) -> bool {
        resource.can_invoke(action)
    }

    /// Invoke a declared action
    ///
    /// Fails without any request when the action is absent or declares a
    /// method other than POST, PUT or DELETE. The target is the template's
    /// `target` when set, the resource's self href otherwise. DELETE sends
    /// no body and always yields `None`.
    pub async fn invoke<T>(
        &self,
        resource: &Resource<T>,
        action: &str,
        payload: Option<Value>,
    ) -> Result<Option<Value>, HalError> {
        let template = resource.require_template(action)?;
        let method = template.dispatch_method()?;
        let target = template.target.as_deref().unwrap_or_else(|| resource.self_href());
        let url = self.resolve(target)?;

        tracing::debug!(
            href = %resource.self_href(),
            action = %action,
            method = %method,
            target = %url,
            "Invoking action"
        );

        let request = self.request(method, url);
        let body = match method {
            Method::Delete => {
                self.inner.transport.execute(request).await?;
                None
            }
            _ => self.inner.transport.execute(request.body(payload)).await?,
        };

        self.simulate_delay().await;
        Ok(body)
    }

    /// Invoke an action with a serializable payload
    pub async fn invoke_with<T, P: Serialize + ?Sized>(
        &self,
        resource: &Resource<T>,
        action: &str,
        payload: &P,
    ) -> Result<Option<Value>, HalError> {
        let payload = serde_json::to_value(payload).map_err(|e| HalError::decode(format!("payload of '{}'", action), e))?;
        self.invoke(resource, action, Some(payload)).await
    }

    /// Invoke an action that answers with a resource
    pub async fn invoke_resource<T, P: Serialize + ?Sized>(
        &self,
        resource: &Resource<T>,
        action: &str,
        payload: &P,
    ) -> Result<Resource, HalError> {
        let body = self.invoke_with(resource, action, payload).await?;
        parse_body(body, &format!("response of '{}'", action))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn request(&self, method: Method, url: Url) -> HttpRequest {
        HttpRequest::new(method, url.as_str()).header("Accept", self.inner.config.accept.clone())
    }

    async fn get(&self, url: Url) -> Result<Resource, HalError> {
        let context = url.to_string();
        let body = self.inner.transport.execute(self.request(Method::Get, url)).await?;
        parse_body(body, &context)
    }

    /// Absolute URL for an href, relative ones resolved against the root
    fn resolve(&self, href: &str) -> Result<Url, HalError> {
        self.inner
            .base_url
            .join(href)
            .map_err(|e| HalError::Config(format!("invalid href '{}': {}", href, e)))
    }

    fn link_url(&self, link: &Link, params: Option<&QueryParams>) -> Result<Url, HalError> {
        let mut url = self.resolve(&link.resolved_href())?;
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn simulate_delay(&self) {
        let delay = self.inner.config.response_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn parse_body(body: Option<Value>, context: &str) -> Result<Resource, HalError> {
    let body = body.ok_or_else(|| HalError::decode(context.to_string(), "empty body"))?;
    Resource::from_value(body).map_err(|e| match e {
        HalError::Decode { message, .. } => HalError::Decode {
            context: context.to_string(),
            message,
        },
        other => other,
    })
}
