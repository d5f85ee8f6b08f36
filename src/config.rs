/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可, JWT 検証設定, 転送タイムアウトなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,
    pub claims_namespace: String,

    pub forward_timeout: Duration,
    pub request_timeout: Duration,
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

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_algorithm = parse_hmac_algorithm(
            &std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
        )
        .ok_or(ConfigError::Invalid("JWT_ALGORITHM"))?;

        let auth_issuer = non_empty_var("AUTH_ISSUER");
        let auth_audience = non_empty_var("AUTH_AUDIENCE");

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let claims_namespace =
            non_empty_var("CLAIMS_NAMESPACE").unwrap_or_else(|| "flipdocs".to_string());
        if claims_namespace.contains('.') {
            return Err(ConfigError::Invalid("CLAIMS_NAMESPACE"));
        }

        let forward_timeout = seconds_var("FORWARD_TIMEOUT_SECONDS", 30);
        let request_timeout = seconds_var("REQUEST_TIMEOUT_SECONDS", 60);
        check_timeouts(forward_timeout, request_timeout)?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            jwt_algorithm,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            claims_namespace,
            forward_timeout,
            request_timeout,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn seconds_var(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

// A hung downstream must fail inside the forwarder (500), never at the
// outer request timeout (408).
fn check_timeouts(forward: Duration, request: Duration) -> Result<(), ConfigError> {
    if forward >= request {
        return Err(ConfigError::Invalid("FORWARD_TIMEOUT_SECONDS"));
    }
    Ok(())
}

// Tokens are signed with a shared secret, so only the HMAC family applies.
pub fn parse_hmac_algorithm(raw: &str) -> Option<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}
