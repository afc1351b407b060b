//! Startup configuration: command line credentials, environment settings and
//! the park list file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use campground_scan::ParkQuery;
use clap::Parser;
use reserve_america::ReserveAmericaConfig;

/// Command line of the availability watcher
#[derive(Parser, Debug, Clone)]
#[command(
    name = "campsite_watch",
    about = "Report newly opened or closed campsite dates to a Telegram chat"
)]
pub struct Cli {
    /// Telegram bot token used to send change reports
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub bot_token: String,

    /// Telegram chat that receives the change reports
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: String,
}

/// Settings read from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON file listing the parks to watch
    pub park_info_path: PathBuf,
    /// Directory holding one snapshot file per park and site type
    pub snapshot_dir: PathBuf,
    /// Reservation site endpoints
    pub reserve_america: ReserveAmericaConfig,
    /// Pause between parks
    pub park_delay: Duration,
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ReserveAmericaConfig::default();

        let park_delay = match lookup("PARK_DELAY_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("PARK_DELAY_SECS must be whole seconds, got {:?}", raw))?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(1),
        };

        Ok(Self {
            park_info_path: lookup("PARK_INFO_PATH")
                .unwrap_or_else(|| "park_info.json".to_string())
                .into(),
            snapshot_dir: lookup("SNAPSHOT_DIR").unwrap_or_else(|| ".".to_string()).into(),
            reserve_america: ReserveAmericaConfig {
                base_url: lookup("RESERVE_AMERICA_BASE_URL").unwrap_or(defaults.base_url),
                contract_code: lookup("RESERVE_AMERICA_CONTRACT_CODE")
                    .unwrap_or(defaults.contract_code),
                ..defaults
            },
            park_delay,
        })
    }
}

/// Load the park list, dropping entries that fail validation
pub fn load_park_queries(path: &Path) -> Result<Vec<ParkQuery>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read park list: {}", path.display()))?;

    parse_park_queries(&contents)
        .with_context(|| format!("failed to parse park list: {}", path.display()))
}

fn parse_park_queries(contents: &str) -> Result<Vec<ParkQuery>> {
    let parks: Vec<ParkQuery> = serde_json::from_str(contents)?;

    Ok(parks
        .into_iter()
        .filter(|park| match park.check() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("⚠️ Skipping park {:?} ({:?}): {}", park.park_name, park.park_id, e);
                false
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_cli_requires_both_credentials() {
        let cli = Cli::try_parse_from(["campsite_watch", "--bot-token", "123:abc", "--chat-id", "42"])
            .unwrap();
        assert_eq!(cli.bot_token, "123:abc");
        assert_eq!(cli.chat_id, "42");

        assert!(Cli::try_parse_from(["campsite_watch", "--bot-token", "123:abc", "--verbose"]).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.park_info_path, PathBuf::from("park_info.json"));
        assert_eq!(settings.snapshot_dir, PathBuf::from("."));
        assert_eq!(settings.park_delay, Duration::from_secs(1));
        assert_eq!(settings.reserve_america.contract_code, "OR");
        assert_eq!(settings.reserve_america.batch_size, 25);
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("PARK_INFO_PATH", "/etc/campsite/parks.json"),
            ("SNAPSHOT_DIR", "/var/lib/campsite"),
            ("PARK_DELAY_SECS", "3"),
            ("RESERVE_AMERICA_BASE_URL", "https://washington.example.com/"),
            ("RESERVE_AMERICA_CONTRACT_CODE", "WA"),
        ]))
        .unwrap();

        assert_eq!(settings.park_info_path, PathBuf::from("/etc/campsite/parks.json"));
        assert_eq!(settings.snapshot_dir, PathBuf::from("/var/lib/campsite"));
        assert_eq!(settings.park_delay, Duration::from_secs(3));
        assert_eq!(
            settings.reserve_america.page_url(),
            "https://washington.example.com/campsitePaging.do"
        );
        assert_eq!(settings.reserve_america.contract_code, "WA");

        assert!(Settings::from_lookup(lookup(&[("PARK_DELAY_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_parse_park_queries_skips_invalid() {
        let parks = parse_park_queries(
            r#"[
                {"park_id": "402146", "park_name": "Silver Falls"},
                {"park_id": "", "park_name": "No Id"},
                {"park_id": "402191", "park_name": "Cape Lookout", "site_type": "YURT",
                 "start_date": "2024-07-10", "end_date": "2024-07-01"},
                {"park_id": "402128", "park_name": "Fort Stevens", "site_type": "YURT",
                 "start_date": "2024-07-01", "end_date": "2024-07-10"}
            ]"#,
        )
        .unwrap();

        let ids: Vec<&str> = parks.iter().map(|p| p.park_id.as_str()).collect();
        assert_eq!(ids, vec!["402146", "402128"]);
        assert_eq!(parks[0].site_type, "TENT SITE");
        assert_eq!(parks[1].site_type, "YURT");
    }

    #[test]
    fn test_load_park_queries_errors() {
        let temp_dir = TempDir::new().unwrap();

        assert!(load_park_queries(&temp_dir.path().join("missing.json")).is_err());

        let bad = temp_dir.path().join("bad.json");
        std::fs::write(&bad, r#"[{"park_id": "1", "park_name": "X", "start_date": "July"}]"#).unwrap();
        assert!(load_park_queries(&bad).is_err());

        let good = temp_dir.path().join("good.json");
        std::fs::write(&good, r#"[{"park_id": "1", "park_name": "X"}]"#).unwrap();
        assert_eq!(load_park_queries(&good).unwrap().len(), 1);
    }
}
