/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, STYTCH_DOMAIN, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    /// Session token issuer. Not used for verification yet.
    pub stytch_domain: Url,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            parse_origins(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let stytch_domain = parse_domain(
            &std::env::var("STYTCH_DOMAIN").map_err(|_| ConfigError::Missing("STYTCH_DOMAIN"))?,
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            stytch_domain,
        })
    }

    /// Where the issuer publishes its signing keys.
    pub fn jwks_url(&self) -> Url {
        let mut url = self.stytch_domain.clone();
        url.set_path("/.well-known/jwks.json");
        url.set_query(None);
        url
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_domain(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::Missing("STYTCH_DOMAIN"));
    }

    let url = Url::parse(raw).map_err(|_| ConfigError::Invalid("STYTCH_DOMAIN"))?;
    match url.scheme() {
        "https" | "http" if url.has_host() => Ok(url),
        _ => Err(ConfigError::Invalid("STYTCH_DOMAIN")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_domain(domain: &str) -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            stytch_domain: parse_domain(domain).unwrap(),
        }
    }

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse(" PROD "), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
        assert_eq!(AppEnv::parse(""), AppEnv::Development);
    }

    #[test]
    fn origins_are_trimmed_and_filtered() {
        assert_eq!(
            parse_origins(" http://localhost:3000/ , ,https://app.example.com"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn domain_must_be_absolute_http_url() {
        assert!(parse_domain("https://login.example.com").is_ok());
        assert!(matches!(
            parse_domain("   "),
            Err(ConfigError::Missing("STYTCH_DOMAIN"))
        ));
        assert!(matches!(
            parse_domain("login.example.com"),
            Err(ConfigError::Invalid("STYTCH_DOMAIN"))
        ));
        assert!(matches!(
            parse_domain("ftp://login.example.com"),
            Err(ConfigError::Invalid("STYTCH_DOMAIN"))
        ));
    }

    #[test]
    fn jwks_url_replaces_path() {
        let config = config_with_domain("https://login.example.com/some/path?x=1");
        assert_eq!(
            config.jwks_url().as_str(),
            "https://login.example.com/.well-known/jwks.json"
        );

        let config = config_with_domain("https://login.example.com");
        assert_eq!(
            config.jwks_url().as_str(),
            "https://login.example.com/.well-known/jwks.json"
        );
    }
}
