use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    OEmbed,
    YtDlp
}

impl std::str::FromStr for MetadataBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oembed" => Ok(Self::OEmbed),
            "yt-dlp" | "ytdlp" => Ok(Self::YtDlp),
            other => Err(format!("unknown metadata provider: {other}"))
        }
    }
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub download_dir: PathBuf,
    pub request_timeout: Duration,
    pub ytdlp_path: String,
    pub ytdlp_cookies: Option<PathBuf>,
    /// Passed to every yt-dlp run, split on whitespace.
    pub ytdlp_extra_args: Vec<String>,
    pub metadata_backend: MetadataBackend,
    pub oembed_endpoint: String
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: "./novatube.db".to_string(),
            download_dir: PathBuf::from("./downloads"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ytdlp_path: "yt-dlp".to_string(),
            ytdlp_cookies: None,
            ytdlp_extra_args: Vec::new(),
            metadata_backend: MetadataBackend::OEmbed,
            oembed_endpoint: "https://www.youtube.com/oembed".to_string()
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or(get("PORT"), "PORT", defaults.port);
        let timeout_secs = parse_or(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let metadata_backend = parse_or(get("METADATA_PROVIDER"), "METADATA_PROVIDER", defaults.metadata_backend);

        Self {
            port,
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            download_dir: get("DOWNLOAD_DIR").map_or(defaults.download_dir, PathBuf::from),
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
            ytdlp_path: get("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ytdlp_cookies: get("YTDLP_COOKIES").map(PathBuf::from),
            ytdlp_extra_args: get("YTDLP_EXTRA_ARGS")
                .map(|raw| raw.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
            metadata_backend,
            oembed_endpoint: get("OEMBED_ENDPOINT").unwrap_or(defaults.oembed_endpoint)
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_path, "./novatube.db");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.metadata_backend, MetadataBackend::OEmbed);
        assert!(config.ytdlp_cookies.is_none());
        assert!(config.ytdlp_extra_args.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DOWNLOAD_DIR", "/data/downloads"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("METADATA_PROVIDER", "yt-dlp"),
            ("YTDLP_COOKIES", "/data/cookies.txt"),
            ("YTDLP_EXTRA_ARGS", "--extractor-args  youtube:player-client=mweb")
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.download_dir, PathBuf::from("/data/downloads"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.metadata_backend, MetadataBackend::YtDlp);
        assert_eq!(config.ytdlp_cookies, Some(PathBuf::from("/data/cookies.txt")));
        assert_eq!(config.ytdlp_extra_args, vec!["--extractor-args", "youtube:player-client=mweb"]);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("REQUEST_TIMEOUT_SECS", "-3"),
            ("METADATA_PROVIDER", "carrier-pigeon"),
            ("DATABASE_PATH", "   ")
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.metadata_backend, MetadataBackend::OEmbed);
        assert_eq!(config.database_path, "./novatube.db");
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "0")]);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }
}
