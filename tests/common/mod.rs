#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    response::Response,
};
use axum_test::TestServer;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::Layer;
use url::Url;

use share_links::api::middleware::rate_limit::ManualClock;
use share_links::config::Config;
use share_links::error::AppError;
use share_links::infrastructure::cache::MemoryCache;
use share_links::infrastructure::kv::{KvStore, MemoryKv};
use share_links::infrastructure::origin::{OriginClient, OriginError};
use share_links::routes::app_router;
use share_links::state::{AppState, Backends};
use share_links::utils::code_generator::{CodeSource, RandomCodes};

pub const APP_ORIGIN: &str = "https://app.example";
pub const ADMIN_TOKEN: &str = "integration-admin-token";
pub const SHELL: &str = "<!doctype html><html><head><title>Planner</title></head><body></body></html>";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// How the stub origin behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OriginMode {
    /// Serves [`SHELL`] and echoes forwarded requests.
    Up,
    /// Fails every call as an unreachable upstream.
    Down,
    /// Behaves as if no upstream were configured.
    Absent,
}

pub struct StubOrigin {
    pub mode: OriginMode,
    pub forwarded: Mutex<Vec<String>>,
}

impl StubOrigin {
    pub fn new(mode: OriginMode) -> Self {
        Self {
            mode,
            forwarded: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OriginClient for StubOrigin {
    async fn fetch_shell(&self) -> Result<String, OriginError> {
        match self.mode {
            OriginMode::Up => Ok(SHELL.to_string()),
            OriginMode::Down => Err(OriginError::Upstream("connection refused".to_string())),
            OriginMode::Absent => Err(OriginError::NotConfigured),
        }
    }

    async fn forward(&self, request: Request) -> Result<Response, OriginError> {
        let line = format!("{} {}", request.method(), request.uri().path());
        match self.mode {
            OriginMode::Up => {
                self.forwarded.lock().unwrap().push(line.clone());
                Ok(Response::builder()
                    .status(200)
                    .header("content-type", "text/plain")
                    .body(Body::from(format!("origin saw {line}")))
                    .unwrap())
            }
            OriginMode::Down => Err(OriginError::Upstream("connection refused".to_string())),
            OriginMode::Absent => Err(OriginError::NotConfigured),
        }
    }
}

/// Hands out queued word codes, then random ones.
#[derive(Default)]
pub struct QueuedCodes {
    words: Mutex<VecDeque<String>>,
}

impl QueuedCodes {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: Mutex::new(words.iter().map(|w| w.to_string()).collect()),
        }
    }
}

impl CodeSource for QueuedCodes {
    fn word_code(&self) -> String {
        self.words
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RandomCodes.word_code())
    }

    fn fallback_code(&self) -> Result<String, AppError> {
        RandomCodes.fallback_code()
    }
}

/// Knobs for [`spawn_app`].
pub struct TestOptions {
    pub config: Config,
    pub links_store: bool,
    pub telemetry_store: bool,
    pub origin: OriginMode,
    pub codes: Vec<&'static str>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            config: test_config(),
            links_store: true,
            telemetry_store: true,
            origin: OriginMode::Up,
            codes: Vec::new(),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<MemoryKv>,
    pub telemetry: Arc<MemoryKv>,
    pub cache: Arc<MemoryCache>,
    pub origin: Arc<StubOrigin>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Waits for the background cache write that follows a redirect.
    pub async fn wait_for_cache(&self, entries: usize) {
        for _ in 0..100 {
            if self.cache.len() >= entries {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("cache never reached {entries} entries");
    }
}

pub fn test_config() -> Config {
    let mut config = Config::new(Url::parse(APP_ORIGIN).unwrap());
    config.admin_token = Some(ADMIN_TOKEN.to_string());
    config.store_retry_delay_ms = 1;
    config
}

pub fn spawn_app(options: TestOptions) -> TestApp {
    let links = Arc::new(MemoryKv::new());
    let telemetry = Arc::new(MemoryKv::new());
    let cache = Arc::new(MemoryCache::new());
    let origin = Arc::new(StubOrigin::new(options.origin));
    let clock = Arc::new(ManualClock::new());

    let backends = Backends {
        links_store: options
            .links_store
            .then(|| links.clone() as Arc<dyn KvStore>),
        telemetry_store: options
            .telemetry_store
            .then(|| telemetry.clone() as Arc<dyn KvStore>),
        cache: cache.clone(),
        origin: origin.clone(),
        codes: Arc::new(QueuedCodes::new(&options.codes)),
        clock: clock.clone(),
    };

    let state = AppState::new(options.config, backends).unwrap();
    let app = app_router(state).layer(MockConnectInfoLayer);

    TestApp {
        server: TestServer::new(app).unwrap(),
        links,
        telemetry,
        cache,
        origin,
        clock,
    }
}

pub fn default_app() -> TestApp {
    spawn_app(TestOptions::default())
}
