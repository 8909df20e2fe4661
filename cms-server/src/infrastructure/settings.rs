use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 10)?;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let default_page_size = parse_u32_env("DEFAULT_PAGE_SIZE", 10)?;
        let max_page_size = parse_u32_env("MAX_PAGE_SIZE", 100)?;

        if default_page_size > max_page_size {
            return Err(anyhow!("DEFAULT_PAGE_SIZE must be <= MAX_PAGE_SIZE"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            default_page_size,
            max_page_size,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    parse_positive(key, std::env::var(key).ok(), default)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    parse_positive(key, std::env::var(key).ok(), default)
}

fn parse_positive<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?,
        None => default,
    };

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_cors_origins, parse_positive};

    #[test]
    fn cors_origins_are_trimmed_and_filtered() {
        let origins = parse_cors_origins(" http://a.test , ,http://b.test".to_string());
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn positive_numbers_fall_back_to_default() {
        let value: u32 = parse_positive("DEFAULT_PAGE_SIZE", None, 10).expect("default must be used");
        assert_eq!(value, 10);

        let value: u32 =
            parse_positive("DEFAULT_PAGE_SIZE", Some(" 25 ".to_string()), 10).expect("must parse");
        assert_eq!(value, 25);
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        assert!(parse_positive::<u32>("MAX_PAGE_SIZE", Some("0".to_string()), 10).is_err());
        assert!(parse_positive::<usize>("HTTP_CONCURRENCY_LIMIT", Some("lots".to_string()), 1).is_err());
    }
}
