use toml::Value;

use crate::system::Result;

pub struct Config {
    pub port: u16,
    pub ttl: u32,
    pub records_file: String,
    pub log_level: String,
}

impl Config {
    fn new() -> Self {
        Config {
            port: 53,
            ttl: 120,
            records_file: "records.conf".to_string(),
            log_level: "INFO".to_string(),
        }
    }

    fn from_toml_str(content: &str) -> Result<Self> {
        let value = content.parse::<Value>()?;
        let config = Config::new();
        Ok(Config {
            port: value
                .get("port")
                .and_then(Value::as_integer)
                .map(|v| v as u16)
                .unwrap_or(config.port),
            ttl: value
                .get("ttl")
                .and_then(Value::as_integer)
                .map(|v| v as u32)
                .unwrap_or(config.ttl),
            records_file: value
                .get("records")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or(config.records_file),
            log_level: value
                .get("log_level")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or(config.log_level),
        })
    }
}

/// Settings from a TOML file; a missing file means stock defaults.
pub async fn init_from_toml(path: &str) -> Result<Config> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Config::from_toml_str(&content),
        Err(_) => Ok(Config::new()),
    }
}

/// Reads the records file into (name, address text) pairs. Address parsing
/// happens later, at table build time.
pub async fn read_record_pairs(path: &str) -> Result<Vec<(String, String)>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_record_pairs(&content))
}

/// One `name address` pair per line, `#` starts a comment. A line with a
/// name but no address is logged and skipped; the load continues.
pub fn parse_record_pairs(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .enumerate()
        .filter_map(|(lineno, line)| {
            let line = line.split('#').next().unwrap_or("");
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(name), Some(address)) => Some((name.to_string(), address.to_string())),
                (Some(_), None) => {
                    error!("error at line {}, skipping", lineno + 1);
                    None
                }
                _ => None,
            }
        })
        .collect()
}
