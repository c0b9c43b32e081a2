//! Rate limiting for the credential endpoints, using governor and
//! `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that identifies clients by IP address.
///
/// The key is the peer address of the TCP connection, which needs the server
/// to be started with `into_make_service_with_connect_info`. Proxy headers
/// (`X-Forwarded-For`, then `X-Real-IP`) are only read when that peer is one
/// of the configured trusted proxies.
#[derive(Clone, Debug)]
pub struct ClientIpKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub fn new(trusted_proxies: &[IpAddr]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req, &self.trusted_proxies).ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip<T>(req: &Request<T>, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())?;
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let headers = req.headers();

    // Walk the chain from the nearest hop; the first address that is not one
    // of our proxies is the client. Entries left of it are client-supplied.
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let hops = forwarded
            .rsplit(',')
            .map(|s| s.trim().parse::<IpAddr>().ok());
        for hop in hops {
            match hop {
                Some(ip) if trusted_proxies.contains(&ip) => {}
                Some(ip) => return Some(ip),
                None => break,
            }
        }
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    Some(peer)
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for login and registration: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// valid positive values, which `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter(trusted_proxies: &[IpAddr]) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trusted_proxies))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
