//! 環境変数からのアプリケーション設定

use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 設定値の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQLの接続URL（未設定ならメモリストアで起動する）
    pub database_url: Option<String>,
    /// コネクションプールの最大接続数
    pub database_max_connections: u32,
    /// 待ち受けアドレス
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// `.env` を読み込んだうえで環境変数から設定を作る
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の値の取得関数から設定を作る
    ///
    /// - `DATABASE_URL`: 空文字は未設定として扱う
    /// - `DATABASE_MAX_CONNECTIONS`: 既定値 5
    /// - `BIND_ADDR`: 既定値 `0.0.0.0`
    /// - `PORT`: 既定値 8080
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", &lookup, DEFAULT_MAX_CONNECTIONS)?;
        let port = parse_or("PORT", &lookup, DEFAULT_PORT)?;

        let host = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let ip: IpAddr = host.parse().map_err(|_| ConfigError::InvalidValue {
            name: "BIND_ADDR",
            value: host.clone(),
        })?;

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/library"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "3000"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/library")
        );
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_bind_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-ip")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "BIND_ADDR", .. }));
    }
}
