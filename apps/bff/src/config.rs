//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。

use std::{env, time::Duration};

use thiserror::Error;

/// 上流呼び出しのタイムアウト（秒）のデフォルト値
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// BFF サーバーの設定
#[derive(Clone)]
pub struct BffConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// Users サービスの URL
    pub users_service_url: String,
    /// Posts サービスの URL
    pub posts_service_url: String,
    /// セッショントークンの HMAC 鍵
    pub jwt_secret: String,
    /// 上流サービス呼び出し 1 回あたりのタイムアウト
    pub upstream_timeout: Duration,
    /// セッション Cookie に `Secure` を付けるか
    pub cookie_secure: bool,
}

impl std::fmt::Debug for BffConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BffConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("users_service_url", &self.users_service_url)
            .field("posts_service_url", &self.posts_service_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("upstream_timeout", &self.upstream_timeout)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

impl BffConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の取得関数から設定を読み込む
    ///
    /// テストでは環境変数を書き換えずにマップから読み込む。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port_raw = required("BFF_PORT")?;
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name:  "BFF_PORT",
            value: port_raw.clone(),
        })?;

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name:  "UPSTREAM_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        Ok(Self {
            host: lookup("BFF_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            users_service_url: required("USERS_SERVICE_URL")?,
            posts_service_url: required("POSTS_SERVICE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            upstream_timeout,
            cookie_secure: lookup("COOKIE_SECURE").is_some_and(|v| parse_bool(&v)),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
