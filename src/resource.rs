use std::error::Error;

use url::Url;

use crate::config::CSRF_COOKIE_NAME;

/// Just a wrapper around the server URL and the anti-forgery token state-changing requests must carry
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
    csrf_token: Option<String>,
}

impl Resource {
    pub fn new(url: Url, csrf_token: Option<String>) -> Self {
        Self { url, csrf_token }
    }

    /// Build a resource from the `SEMINAR_BOARD_URL` and `SEMINAR_BOARD_CSRF_TOKEN` environment variables
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let url = std::env::var("SEMINAR_BOARD_URL")
            .map_err(|_| "SEMINAR_BOARD_URL is not set")?;
        let url = Url::parse(&url)?;
        let csrf_token = std::env::var("SEMINAR_BOARD_CSRF_TOKEN").ok();
        Ok(Self::new(url, csrf_token))
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn csrf_token(&self) -> Option<&str> { self.csrf_token.as_deref() }

    pub fn set_csrf_token(&mut self, token: Option<String>) {
        self.csrf_token = token;
    }

    /// Pick the anti-forgery token from a raw `Cookie` header value (e.g. `a=1; csrftoken=abc`)
    pub fn set_csrf_token_from_cookies(&mut self, cookie_header: &str) {
        self.csrf_token = cookie_value(cookie_header, CSRF_COOKIE_NAME);
    }

    /// Build the URL of an endpoint by keeping the scheme and server from `self` but changing the path part
    pub fn combine(&self, new_path: &str) -> Url {
        let mut built = self.url.clone();
        built.set_path(new_path);
        built
    }

    /// Whether `url` has the same scheme, host and port as the server
    pub fn is_same_origin(&self, url: &Url) -> bool {
        self.url.origin() == url.origin()
    }

    /// Resolve the link of a seminar card (absolute, or relative to the server root) and tell how to follow it
    pub fn card_navigation(&self, href: &str) -> CardNavigation {
        match self.combine("/").join(href) {
            Ok(url) if self.is_same_origin(&url) => CardNavigation::SameTab(url),
            Ok(url) => CardNavigation::NewTab(url),
            Err(err) => {
                log::warn!("Invalid card link {:?}: {}", href, err);
                CardNavigation::Unparsed(href.to_string())
            },
        }
    }
}

/// Where following a seminar card leads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardNavigation {
    /// A page of this site, opened in place
    SameTab(Url),
    /// Another site, opened in a new tab without opener nor referrer
    NewTab(Url),
    /// The link could not be parsed and is followed as is
    Unparsed(String),
}

/// Extract a named value from a `Cookie` header, percent-decoded.
///
/// Returns `None` if the cookie is absent, if it appears more than once, or if it does not decode to UTF-8.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    let mut found = cookie_header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value),
                _ => None,
            }
        });

    let first = found.next()?;
    if found.next().is_some() {
        return None;
    }
    match urlencoding::decode(first) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(err) => {
            log::warn!("Unable to decode cookie {}: {}", name, err);
            None
        },
    }
}
