//! ルーター設定（環境変数からの読み込みを含む）

use std::env;

use log::warn;

use crate::router::condition::{parse_conditions, Condition};

/// ミドルウェア解決順序を指定する環境変数
pub const MIDDLEWARE_ORDER_ENV: &str = "TRIEBRIDGE_MIDDLEWARE_ORDER";
/// ミドルウェアキャッシュの有効/無効を指定する環境変数
pub const MIDDLEWARE_CACHE_ENV: &str = "TRIEBRIDGE_MIDDLEWARE_CACHE";

/// ルーター設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// ミドルウェア解決時に試す条件の順序
    pub middleware_order: Vec<Condition>,
    /// 終端ノードごとに解決済みミドルウェアをキャッシュするか
    ///
    /// キャッシュはノード単位なので、パラメータ位置の値によって兄弟ブランチの
    /// 正規表現ノードが変わるようなルート表では無効化すること。
    pub cache_middleware: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            middleware_order: Condition::RESOLUTION_ORDER.to_vec(),
            cache_middleware: true,
        }
    }
}

impl RouterConfig {
    /// 環境変数から設定を読み込む
    ///
    /// 不正な値は警告を出してデフォルト値にフォールバックする。
    pub fn from_env() -> Self {
        let default = Self::default();

        let middleware_order = match env::var(MIDDLEWARE_ORDER_ENV) {
            Ok(raw) => match parse_conditions(&raw) {
                Ok(order) if !order.is_empty() && !has_duplicates(&order) => order,
                Ok(_) => {
                    warn!(
                        "{} must list each condition at most once and not be empty: '{}'",
                        MIDDLEWARE_ORDER_ENV, raw
                    );
                    default.middleware_order
                }
                Err(e) => {
                    warn!("Ignoring {}: {}", MIDDLEWARE_ORDER_ENV, e);
                    default.middleware_order
                }
            },
            Err(_) => default.middleware_order,
        };

        let cache_middleware = env::var(MIDDLEWARE_CACHE_ENV)
            .ok()
            .and_then(|raw| {
                let parsed = parse_flag(&raw);
                if parsed.is_none() {
                    warn!("Ignoring {}: invalid flag '{}'", MIDDLEWARE_CACHE_ENV, raw);
                }
                parsed
            })
            .unwrap_or(default.cache_middleware);

        Self {
            middleware_order,
            cache_middleware,
        }
    }
}

fn has_duplicates(order: &[Condition]) -> bool {
    order
        .iter()
        .enumerate()
        .any(|(i, condition)| order[..i].contains(condition))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::with_vars;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.middleware_order, Condition::RESOLUTION_ORDER.to_vec());
        assert!(config.cache_middleware);
    }

    #[test]
    fn test_from_env_reads_values() {
        with_vars(
            [
                (MIDDLEWARE_ORDER_ENV, Some("literal,regex,param,wildcard")),
                (MIDDLEWARE_CACHE_ENV, Some("off")),
            ],
            || {
                let config = RouterConfig::from_env();
                assert_eq!(config.middleware_order, Condition::MATCH_PRIORITY.to_vec());
                assert!(!config.cache_middleware);
            },
        );
    }

    #[test]
    fn test_from_env_falls_back_on_invalid_values() {
        with_vars(
            [
                (MIDDLEWARE_ORDER_ENV, Some("literal,literal")),
                (MIDDLEWARE_CACHE_ENV, Some("maybe")),
            ],
            || {
                assert_eq!(RouterConfig::from_env(), RouterConfig::default());
            },
        );

        with_vars(
            [
                (MIDDLEWARE_ORDER_ENV, Some("literal,nope")),
                (MIDDLEWARE_CACHE_ENV, None::<&str>),
            ],
            || {
                assert_eq!(RouterConfig::from_env(), RouterConfig::default());
            },
        );
    }
}
