//! Rate limiting middleware using token bucket algorithm.
//!
//! Limits are keyed per client IP. Directly exposed deployments read the
//! socket peer address (requires `into_make_service_with_connect_info`);
//! deployments behind a trusted reverse proxy read `X-Forwarded-For`,
//! `X-Real-IP` and `Forwarded` instead.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub per_second: u64,
    pub burst: u32,
}

/// Public endpoints (login page): 2 requests per second, burst of 100.
pub const PUBLIC: Quota = Quota {
    per_second: 2,
    burst: 100,
};

/// Authenticated API and dashboard: 1 request per second, burst of 10.
///
/// The composition editor previews on every change, so the burst is what
/// matters for interactive use.
pub const SECURE: Quota = Quota {
    per_second: 1,
    burst: 10,
};

fn governor<K>(quota: Quota, key: K) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(quota.per_second)
            .burst_size(quota.burst)
            .key_extractor(key)
            .finish()
            .expect("rate limit quota must be non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies a per-IP limit to every route of `router`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = api::routes::protected_routes();
/// let api = rate_limit::apply(api, rate_limit::SECURE, config.behind_proxy);
/// ```
pub fn apply<S>(router: Router<S>, quota: Quota, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(governor(quota, SmartIpKeyExtractor))
    } else {
        router.layer(governor(quota, PeerIpKeyExtractor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_quota_is_stricter() {
        assert!(SECURE.per_second <= PUBLIC.per_second);
        assert!(SECURE.burst < PUBLIC.burst);
    }
}
