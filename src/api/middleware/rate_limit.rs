//! Rate limiting middleware using token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Token bucket settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub per_second: u64,
    pub burst: u32,
}

impl Limits {
    /// Unauthenticated endpoints: 2 requests per second, burst of 100.
    pub const PUBLIC: Limits = Limits {
        per_second: 2,
        burst: 100,
    };

    /// Authenticated API: 5 requests per second, burst of 50.
    pub const API: Limits = Limits {
        per_second: 5,
        burst: 50,
    };
}

fn governor<K>(
    key_extractor: K,
    limits: Limits,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(limits.per_second)
            .burst_size(limits.burst)
            .finish()
            .expect("rate limit settings are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies a per-IP rate limiter to `router`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// - `behind_proxy = false`: the socket peer address. The server must be
///   started with `into_make_service_with_connect_info::<SocketAddr>()`.
/// - `behind_proxy = true`: `X-Forwarded-For`, `X-Real-IP` and `Forwarded`
///   headers, falling back to the peer address. Enable only behind a
///   trusted reverse proxy.
pub fn apply<S>(router: Router<S>, limits: Limits, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(governor(SmartIpKeyExtractor, limits))
    } else {
        router.layer(governor(PeerIpKeyExtractor, limits))
    }
}
