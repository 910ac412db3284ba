/// Request extractors
///
/// - [`ApiJson`], [`ApiPath`], [`ApiQuery`]: `Json`, `Path` and `Query`
///   whose rejections are [`ApiError`]s, so a malformed body, ID or query
///   string gets the same error envelope as every other failure
/// - [`ClientAddr`]: the caller's address for audit entries, taken from
///   `X-Forwarded-For` or the peer socket

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};
use std::{convert::Infallible, net::SocketAddr};

/// JSON body extractor with API error rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor with API error rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor with API error rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Source address of the request, if known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(client_addr(&parts.headers, &parts.extensions)))
    }
}

/// Resolves the source address
///
/// The first `X-Forwarded-For` entry wins; otherwise the peer address from
/// `ConnectInfo`, which is only present when the server was started with
/// `into_make_service_with_connect_info`.
pub fn client_addr(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(addr) = forwarded {
        return Some(addr.to_string());
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(
            client_addr(&headers, &Extensions::new()).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 51000))));

        assert_eq!(
            client_addr(&HeaderMap::new(), &extensions).as_deref(),
            Some("192.168.1.20")
        );
    }

    #[test]
    fn test_unknown_source() {
        assert_eq!(client_addr(&HeaderMap::new(), &Extensions::new()), None);
    }
}
