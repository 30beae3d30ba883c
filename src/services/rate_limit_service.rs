use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use ipnetwork::IpNetwork;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::GovernorError;
use tower_governor::key_extractor::KeyExtractor;

/// Routes that hash a password and therefore sit behind the stricter limiter.
const AUTH_PATHS: [&str; 2] = ["/accounts/register", "/accounts/login"];

/// Which limiter a request went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitTier {
    Standard,
    Auth,
}

impl RateLimitTier {
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        if AUTH_PATHS.iter().any(|auth| path.ends_with(auth)) { Self::Auth } else { Self::Standard }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Auth => "auth",
        }
    }

    #[must_use]
    pub fn quota(self, config: &RateLimitConfig) -> Quota {
        let (per_second, burst) = match self {
            Self::Standard => (config.per_second, config.burst),
            Self::Auth => (config.auth_per_second, config.auth_burst),
        };
        Quota { replenish_every_ns: 1_000_000_000 / u64::from(per_second.max(1)), burst: burst.max(1) }
    }
}

/// Token-bucket settings for one tier, in the units the governor builder takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quota {
    pub replenish_every_ns: u64,
    pub burst: u32,
}

/// Keys rate limits by client address. `X-Forwarded-For` is only believed when the
/// connecting peer is one of our proxies.
#[derive(Clone, Debug)]
pub struct IpKeyExtractor {
    trusted_proxies: Arc<[IpNetwork]>,
}

impl IpKeyExtractor {
    #[must_use]
    pub fn new(trusted_proxies: Vec<IpNetwork>) -> Self {
        Self { trusted_proxies: trusted_proxies.into() }
    }

    #[must_use]
    pub fn client_ip(&self, headers: &HeaderMap, peer: IpAddr) -> IpAddr {
        if !self.is_proxy(peer) {
            return peer;
        }

        // Hops are appended by each proxy, so the nearest untrusted one is the poster.
        headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find(|hop| !self.is_proxy(*hop))
            .unwrap_or(peer)
    }

    fn is_proxy(&self, ip: IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(ip))
    }
}

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &axum::http::Request<T>) -> Result<Self::Key, GovernorError> {
        let ConnectInfo(peer) =
            req.extensions().get::<ConnectInfo<SocketAddr>>().ok_or(GovernorError::UnableToExtractKey)?;
        Ok(self.client_ip(req.headers(), peer.ip()))
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitService {
    pub extractor: IpKeyExtractor,
    decisions_total: Counter<u64>,
}

impl RateLimitService {
    #[must_use]
    pub fn new(trusted_proxies: Vec<IpNetwork>) -> Self {
        let decisions_total = global::meter("ephemeral-board")
            .u64_counter("board_rate_limit_decisions_total")
            .with_description("Rate limiter verdicts, labelled by tier and outcome")
            .build();
        Self { extractor: IpKeyExtractor::new(trusted_proxies), decisions_total }
    }

    pub fn record_decision(&self, tier: RateLimitTier, status: StatusCode, retry_after: Option<&str>) {
        let outcome = decision_outcome(status);
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(tier = tier.as_str(), retry_after_secs = retry_after, "Rate limit exceeded");
        }
        self.decisions_total.add(1, &[KeyValue::new("tier", tier.as_str()), KeyValue::new("outcome", outcome)]);
    }
}

fn decision_outcome(status: StatusCode) -> &'static str {
    if status == StatusCode::TOO_MANY_REQUESTS { "throttled" } else { "allowed" }
}

/// Middleware placed outside both governor layers; it sees the limiter's verdict on the way out.
pub async fn record_decisions(State(service): State<RateLimitService>, request: Request, next: Next) -> Response {
    let tier = RateLimitTier::for_path(request.uri().path());
    let response = next.run(request).await;

    let retry_after = response.headers().get("x-ratelimit-after").and_then(|v| v.to_str().ok());
    service.record_decision(tier, response.status(), retry_after);

    response
}
