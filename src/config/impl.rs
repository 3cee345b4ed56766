use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::with_defaults(Config::builder())?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖，如 HWSYSTEM__REMINDERS__MORNING_HOUR=8
            .add_source(
                Environment::with_prefix("HWSYSTEM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从常用环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.validate()?;

        Ok(app_config)
    }

    /// 内置默认值，保证没有配置文件时也能启动
    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("app.system_name", "HWSystem Assignments")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080i64)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0i64)?
            .set_default("server.max_workers", 8i64)?
            .set_default("server.timeouts.client_request", 5000i64)?
            .set_default("server.timeouts.client_disconnect", 1000i64)?
            .set_default("server.timeouts.keep_alive", 30i64)?
            .set_default("server.limits.max_payload_size", 1_048_576i64)?
            .set_default("database.url", "hwsystem.db")?
            .set_default("database.pool_size", 8i64)?
            .set_default("database.timeout", 10i64)?
            .set_default("cors.allowed_origins", vec!["*"])?
            .set_default("cors.max_age", 3600i64)?
            .set_default("reminders.enabled", true)?
            .set_default("reminders.tick_interval_secs", 60i64)?
            .set_default("reminders.batch_size", 100i64)?
            .set_default("reminders.concurrency", 8i64)?
            .set_default("reminders.dispatch_timeout_ms", 5000i64)?
            .set_default("reminders.morning_hour", 9i64)?
            .set_default("reminders.utc_offset_minutes", 0i64)?
            .set_default("reminders.overdue_interval_minutes", 1440i64)?
            .set_default("reminders.overdue_max_count", 0i64)?
            .set_default("migration.run_on_startup", false)?
            .set_default("migration.batch_size", 200i64)?
            .set_default("migration.dry_run", false)
    }

    /// 校验取值范围
    fn validate(&self) -> Result<(), ConfigError> {
        let reminders = &self.reminders;
        if reminders.morning_hour > 23 {
            return Err(ConfigError::Message(format!(
                "reminders.morning_hour must be within 0..=23, got {}",
                reminders.morning_hour
            )));
        }
        if reminders.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Message(format!(
                "reminders.utc_offset_minutes out of range: {}",
                reminders.utc_offset_minutes
            )));
        }
        if reminders.overdue_interval_minutes <= 0 {
            return Err(ConfigError::Message(
                "reminders.overdue_interval_minutes must be positive".to_string(),
            ));
        }
        if reminders.batch_size == 0 || self.migration.batch_size == 0 {
            return Err(ConfigError::Message(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_loadable() {
        let config = AppConfig::load().expect("defaults should deserialize");
        assert!(config.server.workers >= 1);
        assert!(config.reminders.batch_size > 0);
        assert!(config.migration.batch_size > 0);
        assert!(config.reminders.morning_hour <= 23);
    }

    #[test]
    fn test_validate_rejects_bad_morning_hour() {
        let mut config = AppConfig::load().expect("defaults should deserialize");
        config.reminders.morning_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_overdue_interval() {
        let mut config = AppConfig::load().expect("defaults should deserialize");
        config.reminders.overdue_interval_minutes = 0;
        assert!(config.validate().is_err());
    }
}
