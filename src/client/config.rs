use crate::error::Error;

const BASE_URL_VAR: &str = "HUDDLE_BASE_URL";
const TOKEN_VAR: &str = "HUDDLE_API_TOKEN";

/// Connection settings for the collaboration service. The bearer token is
/// issued elsewhere and treated as opaque here.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Reads `HUDDLE_BASE_URL` and `HUDDLE_API_TOKEN` from the environment
    /// (a `.env` file is honored when present).
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let base_url =
            dotenv::var(BASE_URL_VAR).map_err(|_| Error::Config(format!("environment variable {} not been set", BASE_URL_VAR)))?;
        let token =
            dotenv::var(TOKEN_VAR).map_err(|_| Error::Config(format!("environment variable {} not been set", TOKEN_VAR)))?;
        Ok(Self::new(base_url, token))
    }
}
