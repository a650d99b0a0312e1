use std::env;

const DEFAULT_BASE_URL: &str = "https://api.taleemapp.com";

/// Backend location for the progress API.
///
/// User id and bearer token are deliberately not part of the configuration;
/// they are passed explicitly into each service call so the services stay
/// free of ambient session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `TALEEM_API_BASE_URL`, falling back to the
    /// shipped default.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("TALEEM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self { base_url }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}
