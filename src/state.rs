//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::api::middleware::cors::OriginPolicy;
use crate::api::middleware::rate_limit::{Clock, RateLimiter};
use crate::application::services::{AuthService, LinkService, TelemetryService};
use crate::config::Config;
use crate::domain::telemetry::TelemetryPolicy;
use crate::error::AppError;
use crate::infrastructure::cache::EdgeCache;
use crate::infrastructure::kv::KvStore;
use crate::infrastructure::origin::OriginClient;
use crate::utils::code_generator::CodeSource;

/// Backends the state is assembled from.
///
/// A `None` store leaves the matching endpoints answering
/// [`AppError::Unconfigured`].
pub struct Backends {
    pub links_store: Option<Arc<dyn KvStore>>,
    pub telemetry_store: Option<Arc<dyn KvStore>>,
    pub cache: Arc<dyn EdgeCache>,
    pub origin: Arc<dyn OriginClient>,
    pub codes: Arc<dyn CodeSource>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub origin_policy: Arc<OriginPolicy>,
    pub links: Option<Arc<LinkService>>,
    pub telemetry: Option<Arc<TelemetryService>>,
    pub auth: Arc<AuthService>,
    pub cache: Arc<dyn EdgeCache>,
    pub limiter: Arc<RateLimiter>,
    pub origin: Arc<dyn OriginClient>,
}

impl AppState {
    /// Wires services over `backends` according to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the admin token gate cannot be keyed.
    pub fn new(config: Config, backends: Backends) -> Result<Self, AppError> {
        let retry = config.retry_policy();

        let links = backends.links_store.map(|store| {
            Arc::new(LinkService::new(
                store,
                backends.codes.clone(),
                retry,
                config.app_origin.clone(),
            ))
        });

        let telemetry = backends.telemetry_store.map(|store| {
            Arc::new(TelemetryService::new(
                store,
                TelemetryPolicy::default(),
                retry,
            ))
        });

        let auth = AuthService::new(config.usable_admin_token(), config.allow_insecure_reset)?;
        let limiter = RateLimiter::new(config.rate_limits(), backends.clock);

        Ok(Self {
            origin_policy: Arc::new(OriginPolicy::from_config(&config)),
            config: Arc::new(config),
            links,
            telemetry,
            auth: Arc::new(auth),
            cache: backends.cache,
            limiter: Arc::new(limiter),
            origin: backends.origin,
        })
    }

    /// The link service, or an operator-facing error when unbound.
    pub fn links(&self) -> Result<&LinkService, AppError> {
        self.links.as_deref().ok_or(AppError::Unconfigured {
            binding: "LINKS_STORE_URL",
        })
    }

    /// The telemetry service, or an operator-facing error when unbound.
    pub fn telemetry(&self) -> Result<&TelemetryService, AppError> {
        self.telemetry.as_deref().ok_or(AppError::Unconfigured {
            binding: "TELEMETRY_STORE_URL",
        })
    }
}
