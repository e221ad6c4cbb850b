use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u32, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, ReportSettings, RuntimeSettings,
    ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_optional("SAEX_HOST")
            .or_else(|| env_optional("SERVER_IP"))
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = env_or_default("SAEX_PORT", "7001");

        let environment =
            parse_environment(env_optional("SAEX_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("SAEX_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Sale Exercises Reports API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_prefix = env_or_default("API_PREFIX", "/api");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let db_host = env_or_default("DB_HOST", "localhost");
        let db_port = parse_u16("DB_PORT", env_or_default("DB_PORT", "3306"))?;
        let db_user = env_or_default("DB_USER", "root");
        let db_password = env_or_default("DB_PASSWORD", "");
        let db_name = env_or_default("DB_NAME", "simulator");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("DB_MAX_CONNECTIONS", env_or_default("DB_MAX_CONNECTIONS", "10"))?;
        let acquire_timeout_seconds = parse_u64(
            "DB_ACQUIRE_TIMEOUT_SECONDS",
            env_or_default("DB_ACQUIRE_TIMEOUT_SECONDS", "30"),
        )?;

        let max_page_size = parse_u32("MAX_PAGE_SIZE", env_or_default("MAX_PAGE_SIZE", "50000"))?;
        let default_page_size =
            parse_u32("DEFAULT_PAGE_SIZE", env_or_default("DEFAULT_PAGE_SIZE", "10000"))?;

        let log_level = env_or_default("SAEX_LOG_LEVEL", "info");
        let json = env_optional("SAEX_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_prefix },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                host: db_host,
                port: db_port,
                user: db_user,
                password: db_password,
                name: db_name,
                database_url,
                max_connections,
                acquire_timeout_seconds,
            },
            reports: ReportSettings { max_page_size, default_page_size },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn reports(&self) -> &ReportSettings {
        &self.reports
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reports.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_PAGE_SIZE",
                value: self.reports.max_page_size.to_string(),
            });
        }

        if self.reports.default_page_size == 0
            || self.reports.default_page_size > self.reports.max_page_size
        {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_PAGE_SIZE",
                value: self.reports.default_page_size.to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DB_MAX_CONNECTIONS",
                value: String::from("0"),
            });
        }

        if !self.api.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_PREFIX",
                value: self.api.api_prefix.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.password.is_empty() {
            return Err(ConfigError::MissingSecret("DB_PASSWORD"));
        }

        Ok(())
    }
}
