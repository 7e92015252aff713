/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::services::auth::{AuthService, TokenVerifier};
use crate::services::jwks::{HttpFetcher, KeySetCache, RefreshPolicy};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>> {
    let fetcher = HttpFetcher::new(config.jwks_fetch_timeout)
        .context("failed to build key set HTTP client")?;

    let cache = Arc::new(KeySetCache::new(
        Arc::new(fetcher),
        RefreshPolicy {
            refresh_interval: config.jwks_refresh_interval,
            min_refresh_interval: config.jwks_min_refresh_interval,
        },
    ));

    let verifier = TokenVerifier::new(
        cache,
        config.jwks_url.as_str(),
        config.access_token_leeway_seconds,
    );

    Ok(Arc::new(AuthService::new(
        verifier,
        &config.expected_issuer,
        &config.expected_audience,
    )))
}
