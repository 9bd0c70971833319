//! Trusted-network filter for internal endpoints.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::collections::HashSet;
use std::net::IpAddr;

use crate::{error::AppError, state::AppState};

const REAL_IP_HEADER: &str = "x-real-ip";

/// Client addresses allowed to call internal endpoints.
///
/// An empty set denies everyone.
#[derive(Debug, Clone, Default)]
pub struct TrustedNetworks {
    addrs: HashSet<IpAddr>,
}

impl TrustedNetworks {
    pub fn new(addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            addrs: addrs.into_iter().collect(),
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.addrs.contains(ip)
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

/// Admits only requests whose `X-Real-IP` header names a trusted address.
///
/// The header is expected to be set by the reverse proxy in front of the
/// service.
///
/// # Errors
///
/// Returns `403 Forbidden` if the header is missing, malformed, or names an
/// untrusted address.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match real_ip(req.headers()) {
        Some(ip) if st.trusted_networks.contains(&ip) => Ok(next.run(req).await),
        ip => Err(AppError::forbidden(
            "Forbidden",
            json!({ "reason": "Caller is not in a trusted network", "ip": ip.map(|ip| ip.to_string()) }),
        )),
    }
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(REAL_IP_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_real_ip_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(real_ip(&headers), None);

        headers.insert(REAL_IP_HEADER, HeaderValue::from_static("garbage"));
        assert_eq!(real_ip(&headers), None);

        headers.insert(REAL_IP_HEADER, HeaderValue::from_static(" 10.0.0.7 "));
        assert_eq!(real_ip(&headers), Some("10.0.0.7".parse().unwrap()));
    }

    #[test]
    fn test_membership() {
        let trusted = TrustedNetworks::new(["10.0.0.7".parse().unwrap()]);

        assert!(trusted.contains(&"10.0.0.7".parse().unwrap()));
        assert!(!trusted.contains(&"10.0.0.8".parse().unwrap()));
        assert!(TrustedNetworks::default().is_empty());
    }
}
