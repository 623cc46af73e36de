use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Language and country used for the `lang` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            country: country.into().to_uppercase(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("pt", "PT")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.language, self.country)
    }
}

/// Registered application credentials and server location.
#[derive(Clone)]
pub struct ApplicationConfig {
    consumer_key: String,
    consumer_secret: String,
    callback_url: Url,
    base_url: Url,
    locale: Locale,
}

impl ApplicationConfig {
    /// Create a configuration with the default `pt-PT` locale.
    ///
    /// # Errors
    ///
    /// If `callback_url` or `base_url` is not an absolute URL.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        callback_url: &str,
        base_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: parse_url("callback URL", callback_url)?,
            base_url: parse_url("base URL", base_url.trim_end_matches('/'))?,
            locale: Locale::default(),
        })
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub(crate) fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn callback_url(&self) -> &Url {
        &self.callback_url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Absolute URL for a resolved endpoint path.
    pub(crate) fn url_for(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        parse_url("endpoint URL", &format!("{base}{path}"))
    }
}

impl fmt::Debug for ApplicationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("callback_url", &self.callback_url.as_str())
            .field("base_url", &self.base_url.as_str())
            .field("locale", &self.locale)
            .finish()
    }
}

fn parse_url(what: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::InvalidConfig {
        message: format!("{what} `{value}`: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApplicationConfig {
        ApplicationConfig::new(
            "key",
            "s3cret",
            "https://app.example/callback",
            "https://fenix.example/",
        )
        .unwrap()
    }

    #[test]
    fn locale_renders_language_dash_country() {
        assert_eq!(Locale::new("EN", "us").to_string(), "en-US");
        assert_eq!(Locale::default().to_string(), "pt-PT");
    }

    #[test]
    fn rejects_relative_urls() {
        let result = ApplicationConfig::new("key", "secret", "/callback", "https://fenix.example");
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn joins_paths_without_double_slash() {
        let url = config().url_for("/api/fenix/v1/degrees").unwrap();
        assert_eq!(url.as_str(), "https://fenix.example/api/fenix/v1/degrees");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let config =
            ApplicationConfig::new("key", "secret", "https://app.example/cb", "https://host/fenix")
                .unwrap();
        assert_eq!(
            config.url_for("/oauth/userdialog").unwrap().as_str(),
            "https://host/fenix/oauth/userdialog"
        );
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
