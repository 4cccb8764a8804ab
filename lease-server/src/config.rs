use lease_backup::BackupConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub backups_dir: PathBuf,
    pub backup_cron: Option<String>,
    pub compression_level: i32,
    pub pre_restore_backup: bool,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "./data".into()));

        Self {
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            db_path: var("DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("arriendos.db")),
            backups_dir: var("BACKUPS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("backups")),
            data_dir,
            backup_cron: var("BACKUP_CRON").filter(|v| !v.trim().is_empty()),
            compression_level: var("COMPRESSION_LEVEL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            pre_restore_backup: var("PRE_RESTORE_BACKUP")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
        }
    }

    pub fn backup_config(&self) -> BackupConfig {
        let mut config = BackupConfig::new(&self.db_path, &self.backups_dir);
        config.compression_level = self.compression_level;
        config.pre_restore_backup = self.pre_restore_backup;
        config.log_level = self.log_level.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(vars(&[]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("./data/arriendos.db"));
        assert_eq!(config.backups_dir, PathBuf::from("./data/backups"));
        assert!(config.backup_cron.is_none());
        assert!(config.pre_restore_backup);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("PORT", "8080"),
            ("DATA_DIR", "/srv/arriendos"),
            ("BACKUP_CRON", "0 0 3 * * *"),
            ("PRE_RESTORE_BACKUP", "false"),
            ("COMPRESSION_LEVEL", "9"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/srv/arriendos/arriendos.db"));
        assert_eq!(config.backup_cron.as_deref(), Some("0 0 3 * * *"));

        let backup = config.backup_config();
        assert!(!backup.pre_restore_backup);
        assert_eq!(backup.compression_level, 9);
        assert_eq!(backup.backup_dir, PathBuf::from("/srv/arriendos/backups"));
    }

    #[test]
    fn test_blank_cron_disables_schedule() {
        let config = AppConfig::from_vars(vars(&[("BACKUP_CRON", "  ")]));
        assert!(config.backup_cron.is_none());
    }
}
