use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub keys: ApiKeys,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Upstream API credentials. Values from `config.json` are overridden by the
/// `OPENCAGE_API_KEY` / `NREL_API_KEY` environment variables when set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiKeys {
    pub opencage_api_key: Option<String>,
    pub nrel_api_key: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        if let Ok(key) = std::env::var("OPENCAGE_API_KEY") {
            config.keys.opencage_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("NREL_API_KEY") {
            config.keys.nrel_api_key = Some(key);
        }
        Ok(config)
    }
}
