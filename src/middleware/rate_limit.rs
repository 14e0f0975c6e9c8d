use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};

use crate::error::{AppError, AppResult};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Per-client-address limiter for the inbound API.
///
/// Allows `max_requests` in a burst, then refills one slot every
/// `window / max_requests`. Excess requests are rejected, never queued.
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    trust_forwarded_for: bool,
}

impl ClientRateLimiter {
    pub fn new(max_requests: u32, window: Duration, trust_forwarded_for: bool) -> AppResult<Self> {
        let burst = NonZeroU32::new(max_requests)
            .ok_or_else(|| AppError::Config("rate limit must allow at least one request".into()))?;
        let quota = Quota::with_period(window / max_requests)
            .ok_or_else(|| AppError::Config("rate limit window must be positive".into()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            trust_forwarded_for,
        })
    }

    /// Takes one slot for `client`, or reports how long until one frees up
    pub fn check(&self, client: IpAddr) -> AppResult<()> {
        match self.limiter.check_key(&client) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let retry_after = not_until.wait_time_from(self.clock.now());
                tracing::warn!(
                    client = %client,
                    retry_after_secs = retry_after.as_secs(),
                    "Rate limit exceeded"
                );
                Err(AppError::RateLimited { retry_after })
            }
        }
    }

    /// Address the request is accounted to
    pub fn client_addr(&self, request: &Request) -> IpAddr {
        if self.trust_forwarded_for {
            if let Some(ip) = forwarded_for(request.headers()) {
                return ip;
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    /// Drops state for clients whose quota has fully recovered
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// First address in `x-forwarded-for`, the original client
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(FORWARDED_FOR_HEADER)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check(limiter.client_addr(&request))?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn addr(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_allows_burst_then_rejects() {
        let limiter = ClientRateLimiter::new(3, Duration::from_secs(900), false).unwrap();

        for _ in 0..3 {
            assert!(limiter.check(addr(1)).is_ok());
        }

        match limiter.check(addr(1)) {
            Err(AppError::RateLimited { retry_after }) => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(300));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = ClientRateLimiter::new(1, Duration::from_secs(60), false).unwrap();

        assert!(limiter.check(addr(1)).is_ok());
        assert!(limiter.check(addr(1)).is_err());
        assert!(limiter.check(addr(2)).is_ok());
    }

    #[test]
    fn test_zero_requests_rejected() {
        assert!(ClientRateLimiter::new(0, Duration::from_secs(60), false).is_err());
    }

    #[test]
    fn test_forwarded_for_only_when_trusted() {
        let request = Request::builder()
            .header(FORWARDED_FOR_HEADER, "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        let trusted = ClientRateLimiter::new(5, Duration::from_secs(60), true).unwrap();
        let untrusted = ClientRateLimiter::new(5, Duration::from_secs(60), false).unwrap();

        assert_eq!(
            trusted.client_addr(&request),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            untrusted.client_addr(&request),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_connect_info_used() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        let socket: SocketAddr = "192.0.2.7:51234".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(socket));

        let limiter = ClientRateLimiter::new(5, Duration::from_secs(60), false).unwrap();
        assert_eq!(limiter.client_addr(&request), socket.ip());
    }
}
