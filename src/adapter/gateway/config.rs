use crate::adapter::gateway::error::RepositoryError;
use crate::entity::day_grid::{HOURS_DAY, MINUTES_HALF_HOUR, MINUTES_HOUR};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use yaml_rust::{Yaml, YamlLoader};

pub const CONFIG_ENV: &str = "ABALOOKUP_CONFIG";
pub const DATA_DIR_ENV: &str = "ABALOOKUP_DATA_DIR";
pub const DEFAULT_CONFIG_FILE: &str = "abalookup.yaml";
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    data_dir: PathBuf,
    hours: u32,
    interval_minutes: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            hours: HOURS_DAY,
            interval_minutes: MINUTES_HALF_HOUR,
        }
    }
}

impl AppConfig {
    // 環境変数 → 設定ファイル → 既定値の順に決める
    pub fn load() -> Result<Self, RepositoryError> {
        let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::load_from_file(Path::new(&config_path))?;

        if let Ok(data_dir) = env::var(DATA_DIR_ENV) {
            debug!(%data_dir, "data directory overridden by environment");
            config.data_dir = PathBuf::from(data_dir);
        }

        info!(
            data_dir = %config.data_dir.display(),
            hours = config.hours,
            interval_minutes = config.interval_minutes,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RepositoryError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(RepositoryError::io(path, err)),
        };

        Self::load_from_str(&text).map_err(|reason| RepositoryError::malformed(path, reason))
    }

    pub fn load_from_str(yaml_str: &str) -> Result<Self, String> {
        let docs = YamlLoader::load_from_str(yaml_str).map_err(|e| e.to_string())?;
        let mut config = Self::default();

        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(config),
        };

        if let Some(data_dir) = doc["data_dir"].as_str() {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(hours) = read_positive(&doc["hours"], "hours", HOURS_DAY)? {
            config.hours = hours;
        }
        if let Some(interval_minutes) =
            read_positive(&doc["interval_minutes"], "interval_minutes", MINUTES_HOUR)?
        {
            config.interval_minutes = interval_minutes;
        }

        Ok(config)
    }

    pub fn new(data_dir: PathBuf, hours: u32, interval_minutes: u32) -> Self {
        Self {
            data_dir,
            hours,
            interval_minutes,
        }
    }

    pub fn get_data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn get_schedules_dir(&self) -> PathBuf {
        self.data_dir.join("schedules")
    }

    pub fn get_users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    pub fn get_hours(&self) -> u32 {
        self.hours
    }

    pub fn get_interval_minutes(&self) -> u32 {
        self.interval_minutes
    }
}

// 1日の時間数は24まで、区間の長さは60分まで
fn read_positive(yaml: &Yaml, name: &str, max: u32) -> Result<Option<u32>, String> {
    match yaml {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(n) if *n > 0 && *n <= i64::from(max) => Ok(Some(*n as u32)),
        _ => Err(format!("'{}' must be an integer between 1 and {}", name, max)),
    }
}

#[test]
fn test_load_from_str_空の場合は既定値() {
    assert_eq!(AppConfig::load_from_str("").unwrap(), AppConfig::default());
}

#[test]
fn test_load_from_str_全ての項目を読み込む() {
    let s = "
data_dir: '/var/lib/abalookup'
hours: 12
interval_minutes: 15
";
    let actual = AppConfig::load_from_str(s).unwrap();

    assert_eq!(actual.get_data_dir(), Path::new("/var/lib/abalookup"));
    assert_eq!(
        actual.get_schedules_dir(),
        Path::new("/var/lib/abalookup/schedules")
    );
    assert_eq!(actual.get_hours(), 12);
    assert_eq!(actual.get_interval_minutes(), 15);
}

#[test]
fn test_load_from_str_0や負の値は拒否される() {
    assert!(AppConfig::load_from_str("interval_minutes: 0").is_err());
    assert!(AppConfig::load_from_str("hours: -3").is_err());
    assert!(AppConfig::load_from_str("hours: 'many'").is_err());
}

#[test]
fn test_load_from_str_上限を超える値は拒否される() {
    assert!(AppConfig::load_from_str("hours: 50000000").is_err());
    assert!(AppConfig::load_from_str("hours: 25").is_err());
    assert!(AppConfig::load_from_str("interval_minutes: 61").is_err());

    let actual = AppConfig::load_from_str("hours: 24\ninterval_minutes: 60").unwrap();
    assert_eq!(actual.get_hours(), 24);
    assert_eq!(actual.get_interval_minutes(), 60);
}

#[test]
fn test_load_from_file_ファイルが無い場合は既定値() {
    let path = env::temp_dir().join(format!("abalookup-missing-{}.yaml", uuid::Uuid::new_v4()));

    assert_eq!(AppConfig::load_from_file(&path).unwrap(), AppConfig::default());
}
