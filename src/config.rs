use crate::errors::ConfigError;

pub const DEFAULT_API_URL: &str = "https://35dee773a9ec441e9f38d5fc249406ce.api.mockbin.io/";

#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    Sqlite { database_url: String },
    Csv { path: String },
    Memory,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub store: StoreBackend,
    pub port: u16,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = get("HOLDINGS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let store = match get("HOLDINGS_STORE").as_deref().map(str::trim) {
            None | Some("sqlite") => StoreBackend::Sqlite {
                database_url: get("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite://data/holdings.db".to_string()),
            },
            Some("csv") => StoreBackend::Csv {
                path: get("HOLDINGS_CSV_PATH").unwrap_or_else(|| "data/holdings.csv".to_string()),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 3001,
        };

        Ok(Self {
            api_url,
            store,
            port,
        })
    }
}
