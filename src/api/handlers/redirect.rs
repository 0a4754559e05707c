//! Handler for short link redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::short_code::ShortCode;
use crate::infrastructure::cache::CachedRedirect;
use crate::state::AppState;

/// Sends a short link to its URL.
///
/// # Endpoint
///
/// `GET /s/{code}`
///
/// # Request Flow
///
/// 1. Malformed or unknown codes, and any store problem, redirect home
/// 2. Browser navigations (`Accept` includes `text/html`) get the application
///    markup with the resolved URL embedded, so the address bar keeps the
///    short path; if the markup cannot be fetched, a plain redirect is sent
/// 3. Other clients get a `302`, served from the edge cache when possible
///
/// # Cache Strategy
///
/// - **Cache hit**: Immediate redirect
/// - **Cache miss**: Resolve from the store, spawn the cache write
/// - **Cache error**: Log and resolve from the store
///
/// This endpoint never fails: every error path ends in a redirect.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(raw_code): Path<String>,
    headers: HeaderMap,
) -> Response {
    let home = state.config.home_url();

    let Ok(code) = ShortCode::parse(&raw_code) else {
        debug!("Malformed short code, redirecting home");
        return home_redirect(&home);
    };

    let links = match state.links() {
        Ok(links) => links,
        Err(e) => {
            warn!(error = %e, "Cannot resolve short link");
            return home_redirect(&home);
        }
    };

    let ttl = state.config.redirect_cache_ttl();

    if wants_html(&headers) {
        let Ok(url) = links.resolve(&code).await else {
            return home_redirect(&home);
        };

        return match state.origin.fetch_shell().await {
            Ok(shell) => shell_response(&inject_state_hint(&shell, &url)),
            Err(e) => {
                debug!(error = %e, "Application markup unavailable, redirecting instead");
                cacheable_redirect(&url, ttl)
            }
        };
    }

    let path = code.public_path();

    match state.cache.get(&path).await {
        Ok(Some(hit)) => {
            metrics::counter!("redirect_cache_hits_total").increment(1);
            debug!(%path, "Cache HIT");
            return cacheable_redirect(&hit.location, ttl);
        }
        Ok(None) => {
            metrics::counter!("redirect_cache_misses_total").increment(1);
            debug!(%path, "Cache MISS");
        }
        Err(e) => {
            metrics::counter!("redirect_cache_misses_total").increment(1);
            warn!(%path, error = %e, "Cache lookup failed, falling back to store");
        }
    }

    let url = match links.resolve(&code).await {
        Ok(url) => url,
        Err(e) => {
            debug!(%path, error = %e, "Short link unusable, redirecting home");
            return home_redirect(&home);
        }
    };

    let response = cacheable_redirect(&url, ttl);

    let cache = state.cache.clone();
    let entry = CachedRedirect { location: url };
    tokio::spawn(async move {
        if let Err(e) = cache.put(&path, &entry, ttl).await {
            warn!(%path, error = %e, "Failed to cache redirect");
        }
    });

    response
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn cacheable_redirect(location: &str, ttl: Duration) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", ttl.as_secs()),
            ),
            (header::VARY, "Accept".to_string()),
        ],
    )
        .into_response()
}

fn home_redirect(home: &str) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, home.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response()
}

fn shell_response(markup: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "private, no-store"),
            (header::VARY, "Accept"),
        ],
        markup.to_string(),
    )
        .into_response()
}

/// Embeds `url` into the application markup right before `</head>`.
///
/// The URL is exposed both as a `<meta name="shared-state-url">` tag and as
/// `window.__SHARED_STATE_URL__`. Markup without a head gets the hint
/// prepended.
pub fn inject_state_hint(markup: &str, url: &str) -> String {
    let script_value = serde_json::to_string(url)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e");

    let hint = format!(
        r#"<meta name="shared-state-url" content="{}"><script>window.__SHARED_STATE_URL__={};</script>"#,
        escape_attribute(url),
        script_value
    );

    match markup.to_ascii_lowercase().find("</head>") {
        Some(at) => format!("{}{}{}", &markup[..at], hint, &markup[at..]),
        None => format!("{hint}{markup}"),
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
