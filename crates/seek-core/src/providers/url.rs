use crate::icon::IconResolver;
use crate::result::{SearchResult, URL_ICON};
use std::sync::Arc;
use url::{ParseError, Url};

/// Interprets any query as a URL.
pub struct UrlProvider {
    icons: Arc<dyn IconResolver>,
}

impl UrlProvider {
    pub fn new(icons: Arc<dyn IconResolver>) -> Self {
        UrlProvider { icons }
    }

    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>),
    {
        let results = match resolve_url(text) {
            Some(url) => vec![SearchResult::url(self.icons.default_icon(URL_ICON), url)],
            None => Vec::new(),
        };
        on_complete(results);
    }
}

/// Parse `text` as a URL, completing a bare host to `http://<host>/`.
///
/// Absolute URLs with a host pass through unchanged. A URL that parses
/// without a host takes `text` as its host, so input such as
/// `localhost:8080` (scheme `localhost`) is rejected.
pub(crate) fn resolve_url(text: &str) -> Option<Url> {
    match Url::parse(text) {
        Ok(url) if url.host().is_some() => Some(url),
        Ok(mut url) => {
            url.set_host(Some(text)).ok()?;
            Some(url)
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            let mut url = Url::parse("http://localhost/").ok()?;
            url.set_host(Some(text)).ok()?;
            Some(url)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconRegistry;
    use crate::result::{Payload, URL_SCORE, URL_SUBTITLE};

    fn run(text: &str) -> Vec<SearchResult> {
        let provider = UrlProvider::new(Arc::new(IconRegistry::new()));
        let mut out = None;
        provider.query(text, |results| out = Some(results));
        out.unwrap()
    }

    #[test]
    fn test_bare_host_defaults_to_http() {
        let results = run("example.com");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "http://example.com/");
        assert_eq!(results[0].subtitle(), URL_SUBTITLE);
        assert_eq!(results[0].score(), URL_SCORE);

        match results[0].payload() {
            Payload::Url(url) => {
                assert_eq!(url.scheme(), "http");
                assert_eq!(url.host_str(), Some("example.com"));
                assert_eq!(url.path(), "/");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_absolute_url_passes_through() {
        let results = run("https://docs.rs/url/latest/url/?search=host#top");
        assert_eq!(
            results[0].title(),
            "https://docs.rs/url/latest/url/?search=host#top"
        );
    }

    #[test]
    fn test_invalid_input_yields_nothing() {
        assert!(run("hello world").is_empty());
        assert!(run("").is_empty());
        assert!(run("http://exa mple.com").is_empty());
    }

    #[test]
    fn test_url_without_host_yields_nothing() {
        // These parse with the text before ':' as the scheme and no host.
        for text in ["localhost:8080", "example.com:8080", "mailto:me@example.com"] {
            assert!(Url::parse(text).unwrap().host().is_none(), "{}", text);
            assert!(resolve_url(text).is_none(), "{}", text);
            assert!(run(text).is_empty(), "{}", text);
        }
    }
}
