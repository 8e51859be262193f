//! Client IP extraction
//!
//! The rate limiter and the contact log both key on the caller's address. Behind a
//! proxy the socket address is the proxy's, so the forwarding headers are consulted
//! first. Every proxy appends the address it received the request from to
//! `X-Forwarded-For`; only those trailing entries are trusted, anything before them
//! was written by the client.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

const UNKNOWN: &str = "unknown";

/// Best-effort client address.
///
/// With `trusted_proxy_count == 0` the headers are ignored and the socket address is
/// used. Otherwise `X-Forwarded-For` decides when present (falling back to the
/// socket if the chain is shorter than expected), then `X-Real-IP`, then the
/// socket, and finally `"unknown"`.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    let socket_ip = socket_addr.map(SocketAddr::ip);

    let resolved = if trusted_proxy_count == 0 {
        socket_ip
    } else if let Some(chain) = headers.get("x-forwarded-for") {
        chain
            .to_str()
            .ok()
            .and_then(|chain| client_from_forwarded_for(chain, trusted_proxy_count))
            .or(socket_ip)
    } else {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_ip)
            .or(socket_ip)
    };

    resolved
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Pick the client out of `client, proxy1, proxy2, ...`.
///
/// The last `trusted_proxy_count` entries were appended by our proxies, the first
/// of them by the proxy facing the client, so that one is the client address.
/// A shorter chain cannot have passed through all of them and yields `None`.
fn client_from_forwarded_for(chain: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let hops: Vec<&str> = chain
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();

    if trusted_proxy_count == 0 || hops.len() < trusted_proxy_count {
        return None;
    }

    parse_ip(hops[hops.len() - trusted_proxy_count])
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}
