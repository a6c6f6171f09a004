use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::ThemeMode;
use crate::stats::DEFAULT_API_BASE;

const FALLBACK_PROGRESS_FILE: &str = "devverse-progress.json";

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore knowledge trees as navigable 3D universes")]
pub struct Args {
    /// Directory with knowledgeverse.json, profileverse.json and devverse.json overrides.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File backing the progress store.
    #[arg(long)]
    pub progress_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ThemeMode::Night)]
    pub theme: ThemeMode,

    /// Delay before children expand after entering a universe.
    #[arg(long, default_value_t = 1500)]
    pub settle_delay_ms: u64,

    /// How long repository stats stay fresh.
    #[arg(long, default_value_t = 300)]
    pub stats_ttl_secs: u64,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub github_api: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub progress_file: PathBuf,
    pub theme: ThemeMode,
    pub settle_delay: Duration,
    pub stats_ttl: Duration,
    pub github_token: Option<String>,
    pub github_api: String,
}

fn default_progress_file() -> PathBuf {
    match directories::ProjectDirs::from("", "", "devverse") {
        Some(dirs) => dirs.data_dir().join("progress.json"),
        None => {
            tracing::warn!("no platform data directory; keeping progress in the working directory");
            PathBuf::from(FALLBACK_PROGRESS_FILE)
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            data_dir: args.data_dir,
            progress_file: args.progress_file.unwrap_or_else(default_progress_file),
            theme: args.theme,
            settle_delay: Duration::from_millis(args.settle_delay_ms),
            stats_ttl: Duration::from_secs(args.stats_ttl_secs),
            github_token: args.github_token.filter(|token| !token.trim().is_empty()),
            github_api: args.github_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> AppConfig {
        let mut full = vec!["devverse"];
        full.extend_from_slice(argv);
        AppConfig::from(Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = parse(&["--progress-file", "p.json"]);
        assert_eq!(config.theme, ThemeMode::Night);
        assert_eq!(config.settle_delay, Duration::from_millis(1500));
        assert_eq!(config.stats_ttl, Duration::from_secs(300));
        assert_eq!(config.github_api, DEFAULT_API_BASE);
        assert_eq!(config.progress_file, PathBuf::from("p.json"));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--theme",
            "day",
            "--settle-delay-ms",
            "250",
            "--data-dir",
            "/tmp/trees",
            "--github-token",
            "  ",
        ]);
        assert_eq!(config.theme, ThemeMode::Day);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/trees")));
        assert!(config.github_token.is_none());
        assert!(config.progress_file.to_string_lossy().ends_with("progress.json"));
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(Args::try_parse_from(["devverse", "--theme", "dusk"]).is_err());
    }
}
