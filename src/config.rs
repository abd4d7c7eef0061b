use crate::errors::DashboardError;
use std::{env, fmt};

pub const USERNAME_VAR: &str = "WHOOP_USERNAME";
pub const PASSWORD_VAR: &str = "WHOOP_PASSWORD";
pub const AUTH_URL_VAR: &str = "WHOOP_AUTH_URL";
pub const API_URL_VAR: &str = "WHOOP_API_URL";

pub const DEFAULT_AUTH_URL: &str = "https://api-7.whoop.com/oauth/token";
pub const DEFAULT_API_URL: &str = "https://api.prod.whoop.com/developer";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct VendorEndpoints {
    pub auth_url: String,
    pub api_url: String,
}

impl Default for VendorEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Everything the dashboard needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub endpoints: VendorEndpoints,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let credentials = credentials_from(&lookup)?;
        let endpoints = endpoints_from(&lookup);
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            credentials,
            endpoints,
            port,
        })
    }
}

pub fn load_credentials() -> Result<Credentials, DashboardError> {
    credentials_from(|name| env::var(name).ok())
}

pub fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials, DashboardError> {
    Ok(Credentials {
        username: required(&lookup, USERNAME_VAR)?,
        password: required(&lookup, PASSWORD_VAR)?,
    })
}

pub fn load_endpoints() -> VendorEndpoints {
    endpoints_from(|name| env::var(name).ok())
}

fn endpoints_from(lookup: impl Fn(&str) -> Option<String>) -> VendorEndpoints {
    let defaults = VendorEndpoints::default();
    VendorEndpoints {
        auth_url: optional(&lookup, AUTH_URL_VAR).unwrap_or(defaults.auth_url),
        api_url: optional(&lookup, API_URL_VAR).unwrap_or(defaults.api_url),
    }
}

/// Blank values count as unset, but a value that is set is returned verbatim.
fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, DashboardError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| DashboardError::Config(format!("{name} is not set")))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
