use std::{env, path::PathBuf};

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub weather_simulation: bool,
    pub max_continuous_work_hours: f64,
    pub min_rest_hours: f64,
    pub seed_data: bool,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            data_dir: PathBuf::from("data"),
            weather_simulation: true,
            max_continuous_work_hours: 8.0,
            min_rest_hours: 12.0,
            seed_data: false,
            log_json: false,
        }
    }
}

impl Config {
    /// Reads the process environment. Call [`load_env_file`] first so `.env`
    /// entries are visible.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            weather_simulation: bool_or(
                "WEATHER_SIMULATION",
                lookup("WEATHER_SIMULATION"),
                defaults.weather_simulation,
            ),
            max_continuous_work_hours: parse_or(
                "MAX_CONTINUOUS_WORK_HOURS",
                lookup("MAX_CONTINUOUS_WORK_HOURS"),
                defaults.max_continuous_work_hours,
            ),
            min_rest_hours: parse_or(
                "MIN_REST_HOURS",
                lookup("MIN_REST_HOURS"),
                defaults.min_rest_hours,
            ),
            seed_data: bool_or("SEED_DATA", lookup("SEED_DATA"), defaults.seed_data),
            log_json: bool_or("LOG_JSON", lookup("LOG_JSON"), defaults.log_json),
        }
    }
}

/// Loads `.env` into the process environment. A missing file is fine; any
/// other failure is handed back so it can be logged once tracing is up.
pub fn load_env_file() -> Option<dotenvy::Error> {
    env_file_problem(dotenvy::dotenv().map(|_| ()))
}

fn env_file_problem(result: Result<(), dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Err(error) if !error.not_found() => Some(error),
        _ => None,
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "unparsable value, using default");
            default
        }),
        None => default,
    }
}

fn bool_or(name: &str, value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1" | "true" | "TRUE" | "yes" | "YES") => true,
        Some("0" | "false" | "FALSE" | "no" | "NO") => false,
        Some(raw) => {
            warn!(variable = name, value = raw, "unparsable flag, using default");
            default
        }
        None => default,
    }
}
