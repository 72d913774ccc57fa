use std::env;

/// Default window during which repeat downloads by the same user are not counted
pub const DEFAULT_DOWNLOAD_DEBOUNCE_SECS: i64 = 300;
/// Longest accepted debounce window (one week)
pub const MAX_DOWNLOAD_DEBOUNCE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL for the API (used in links handed to clients)
    pub api_base_url: String,
    /// Repeat downloads inside this window do not increment the counter
    pub download_debounce_secs: i64,
    /// Registrations with these names receive the admin (moderator) role
    pub admin_names: Vec<String>,
    /// Apply pending schema migrations on startup
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            download_debounce_secs: parse_debounce_secs(
                env::var("DOWNLOAD_DEBOUNCE_SECS").ok().as_deref(),
            ),
            admin_names: env::var("MEDSHARE_ADMIN_NAMES")
                .map(|names| parse_name_list(&names))
                .unwrap_or_default(),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }
}

/// Unset, unparsable or out-of-range values fall back to the default
fn parse_debounce_secs(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_DOWNLOAD_DEBOUNCE_SECS;
    };

    match raw.trim().parse::<i64>() {
        Ok(secs) if (0..=MAX_DOWNLOAD_DEBOUNCE_SECS).contains(&secs) => secs,
        _ => {
            tracing::warn!(
                value = raw,
                "Ignoring invalid DOWNLOAD_DEBOUNCE_SECS, using {}s",
                DEFAULT_DOWNLOAD_DEBOUNCE_SECS
            );
            DEFAULT_DOWNLOAD_DEBOUNCE_SECS
        }
    }
}

/// Split a comma separated list, dropping blanks
fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
