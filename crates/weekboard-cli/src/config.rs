use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use weekboard_core::models::RoleDetection;
use weekboard_core::planner::PlannerConfig;
use weekboard_core::weeks::{DEFAULT_BATCH_SIZE, INITIAL_BATCH_SIZE};

pub const CONFIG_FILE: &str = "weekboard.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub database_path: String,
    /// How combined views recognise work and personal categories
    pub role_detection: RoleDetection,
    pub weeks: WeeksConfig,
    pub server: ServerConfig,
    /// Filter directive for logging, e.g. "debug" or "weekboard_core=trace"
    pub log_level: Option<String>,
}

/// Batch sizes for week generation
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct WeeksConfig {
    pub batch_size: i64,
    pub initial_batch_size: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "weekboard.db".to_string(),
            role_detection: RoleDetection::default(),
            weeks: WeeksConfig::default(),
            server: ServerConfig::default(),
            log_level: None,
        }
    }
}

impl Default for WeeksConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            initial_batch_size: INITIAL_BATCH_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `weekboard.toml`, then `WEEKBOARD_*` variables
    /// (`WEEKBOARD_WEEKS__BATCH_SIZE=4` sets `weeks.batch_size`).
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("WEEKBOARD_").split("__"))
            .extract()
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            role_detection: self.role_detection,
            batch_size: self.weeks.batch_size,
            initial_batch_size: self.weeks.initial_batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let config = Config::new()?;
            assert_eq!(config.database_path, "weekboard.db");
            assert_eq!(config.role_detection, RoleDetection::Name);
            assert_eq!(config.weeks.batch_size, 12);
            assert_eq!(config.weeks.initial_batch_size, 52);
            assert_eq!(config.server.bind, "127.0.0.1:3000");
            Ok(())
        });
    }

    #[test]
    fn file_and_environment_are_merged() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_path = "planner.db"
                role_detection = "explicit"

                [weeks]
                batch_size = 8
                "#,
            )?;
            jail.set_env("WEEKBOARD_WEEKS__INITIAL_BATCH_SIZE", "20");
            jail.set_env("WEEKBOARD_SERVER__BIND", "0.0.0.0:8080");

            let config = Config::new()?;
            assert_eq!(config.database_path, "planner.db");
            assert_eq!(config.role_detection, RoleDetection::Explicit);
            assert_eq!(config.weeks.batch_size, 8);
            assert_eq!(config.weeks.initial_batch_size, 20);
            assert_eq!(config.server.bind, "0.0.0.0:8080");

            let planner = config.planner_config();
            assert_eq!(planner.batch_size, 8);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, r#"database_path = "from-file.db""#)?;
            jail.set_env("WEEKBOARD_DATABASE_PATH", "from-env.db");

            let config = Config::new()?;
            assert_eq!(config.database_path, "from-env.db");
            Ok(())
        });
    }
}
