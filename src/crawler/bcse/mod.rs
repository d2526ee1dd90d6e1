//! # BCSE securities directory
//!
//! The exchange renders its security pages client-side, so the raw markup
//! holds none of the trading figures. Fetching goes through the r.jina.ai
//! rendering proxy, which returns the page as served to a browser.

use concat_string::concat_string;

/// Trading results for a single security
pub mod security;

/// The tracked security's page on the exchange.
pub const SECURITY_URL: &str =
    "https://www.bcse.by/stock/securitydirectory/100345505/5-200-01-3593";

const RENDER_PROXY_PREFIX: &str = "https://r.jina.ai/http://";

/// Wraps a target page URL into its rendering-proxy form. The target keeps
/// its own scheme inside the proxy path; the proxy accepts that shape.
pub(super) fn render_proxy_url(target: &str) -> String {
    concat_string!(RENDER_PROXY_PREFIX, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_proxy_url() {
        assert_eq!(
            render_proxy_url(SECURITY_URL),
            "https://r.jina.ai/http://https://www.bcse.by/stock/securitydirectory/100345505/5-200-01-3593"
        );
    }
}
