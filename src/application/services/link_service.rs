//! Link creation, update and resolution.

use std::sync::Arc;

use serde_json::json;
use url::Url;

use crate::domain::link::{CreatedLink, UpdatedLink, code_key, hash_key};
use crate::domain::short_code::ShortCode;
use crate::error::AppError;
use crate::infrastructure::kv::KvStore;
use crate::utils::app_url::ensure_app_url;
use crate::utils::code_generator::CodeSource;
use crate::utils::retry::RetryPolicy;
use crate::utils::url_hasher::hash_url;

/// Word draws probed before falling back to a hex code.
const WORD_CODE_ATTEMPTS: usize = 10;

/// Service owning the link namespace.
///
/// Every store call goes through the configured [`RetryPolicy`]; exhaustion
/// is surfaced as [`AppError::Internal`]. Cache eviction after an update is
/// left to the caller, which owns the edge cache.
pub struct LinkService {
    store: Arc<dyn KvStore>,
    codes: Arc<dyn CodeSource>,
    retry: RetryPolicy,
    app_origin: Url,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn KvStore>,
        codes: Arc<dyn CodeSource>,
        retry: RetryPolicy,
        app_origin: Url,
    ) -> Self {
        Self {
            store,
            codes,
            retry,
            app_origin,
        }
    }

    /// Returns the code for `long_url`, minting one if needed.
    ///
    /// # Deduplication
    ///
    /// The reverse index `hash:<sha256(url)>` is consulted first. A hit on a
    /// current-shape code is returned with `existing = true`. A hit on a legacy
    /// code counts as a miss: a new code is minted and the index repointed,
    /// while the legacy code stays resolvable.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is malformed, too long or foreign
    /// - [`AppError::GenerationExhausted`] if no free code could be found
    /// - [`AppError::Internal`] on store failure after retries
    pub async fn create(&self, long_url: &str) -> Result<CreatedLink, AppError> {
        let url = ensure_app_url(long_url, &self.app_origin)?;
        let digest = hash_url(&url);
        let index_key = hash_key(&digest);

        if let Some(indexed) = self.read(&index_key).await? {
            match ShortCode::parse(&indexed) {
                Ok(code) if code.is_current_shape() => {
                    tracing::debug!(code = %code, "URL already has a short code");
                    return Ok(CreatedLink {
                        code,
                        existing: true,
                    });
                }
                Ok(code) => tracing::info!(legacy = %code, "Replacing legacy code in reverse index"),
                Err(_) => tracing::warn!(%digest, "Reverse index holds a malformed code, reminting"),
            }
        }

        let code = self.allocate_code().await?;

        self.write(&code_key(code.as_str()), &url).await?;
        self.write(&index_key, code.as_str()).await?;

        metrics::counter!("links_created_total").increment(1);
        tracing::info!(code = %code, "Short link created");

        Ok(CreatedLink {
            code,
            existing: false,
        })
    }

    /// Points an existing code at `long_url`.
    ///
    /// The stale reverse-index entry is removed only while it still names
    /// this code; another code may have taken that URL over since.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed code or URL
    /// - [`AppError::NotFound`] if the code has no mapping
    /// - [`AppError::Internal`] on store failure after retries
    pub async fn update(&self, raw_code: &str, long_url: &str) -> Result<UpdatedLink, AppError> {
        let code = ShortCode::parse(raw_code)?;
        let url = ensure_app_url(long_url, &self.app_origin)?;
        let forward_key = code_key(code.as_str());

        let Some(previous) = self.read(&forward_key).await? else {
            return Err(unknown_code(&code));
        };

        if previous == url {
            return Ok(UpdatedLink {
                code,
                updated: false,
            });
        }

        self.write(&forward_key, &url).await?;

        let stale_key = hash_key(&hash_url(&previous));
        if self.read(&stale_key).await?.as_deref() == Some(code.as_str()) {
            self.remove(&stale_key).await?;
        }

        self.write(&hash_key(&hash_url(&url)), code.as_str()).await?;

        metrics::counter!("links_updated_total").increment(1);
        tracing::info!(code = %code, "Short link updated");

        Ok(UpdatedLink {
            code,
            updated: true,
        })
    }

    /// Returns the URL stored for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown and
    /// [`AppError::Internal`] on store failure.
    pub async fn resolve(&self, code: &ShortCode) -> Result<String, AppError> {
        self.read(&code_key(code.as_str()))
            .await?
            .ok_or_else(|| unknown_code(code))
    }

    /// Looks up the code the reverse index holds for `long_url`.
    ///
    /// Legacy codes are reported as they are; no migration happens here.
    pub async fn find_code(&self, long_url: &str) -> Result<Option<ShortCode>, AppError> {
        let url = ensure_app_url(long_url, &self.app_origin)?;
        let indexed = self.read(&hash_key(&hash_url(&url))).await?;
        Ok(indexed.and_then(|raw| ShortCode::parse(&raw).ok()))
    }

    /// Draws candidates until one is unused in the store.
    async fn allocate_code(&self) -> Result<ShortCode, AppError> {
        for attempt in 1..=WORD_CODE_ATTEMPTS {
            let candidate = self.codes.word_code();
            if self.read(&code_key(&candidate)).await?.is_none() {
                return minted(&candidate);
            }
            tracing::debug!(attempt, "Word code collision");
        }

        let candidate = self.codes.fallback_code()?;
        if self.read(&code_key(&candidate)).await?.is_none() {
            tracing::warn!("Word codes kept colliding, minted a hex code");
            return minted(&candidate);
        }

        Err(AppError::GenerationExhausted)
    }

    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let store = self.store.as_ref();
        self.retry.run(move || store.get(key)).await.map_err(|e| {
            tracing::error!(key, error = %e, "Link store read failed after retries");
            AppError::from(e)
        })
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        let store = self.store.as_ref();
        self.retry
            .run(move || store.put(key, value))
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "Link store write failed after retries");
                AppError::from(e)
            })
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        let store = self.store.as_ref();
        self.retry.run(move || store.delete(key)).await.map_err(|e| {
            tracing::error!(key, error = %e, "Link store delete failed after retries");
            AppError::from(e)
        })
    }
}

fn minted(candidate: &str) -> Result<ShortCode, AppError> {
    ShortCode::parse(candidate)
        .map_err(|_| AppError::internal(format!("generator produced an invalid code: {candidate}")))
}

fn unknown_code(code: &ShortCode) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code.as_str() }))
}
