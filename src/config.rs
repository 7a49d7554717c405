use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub app_name: String,
    pub seed_demo_data: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 8080),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "ziyara-catalog".to_string()),
            seed_demo_data: parse_var("SEED_DEMO_DATA", true),
            rate_limit_per_second: parse_var("RATE_LIMIT_PER_SECOND", 1),
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", 100),
        }
    }

    /// Settings for tests and embedded use against the given database.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            app_name: "ziyara-catalog".to_string(),
            seed_demo_data: false,
            rate_limit_per_second: 1,
            rate_limit_burst: 100,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} has an invalid value: {}", name, raw)),
        Err(_) => default,
    }
}
