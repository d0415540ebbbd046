use crate::shared::errors::{AppError, AppResult};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

impl Environment {
    /// 環境変数の値から実行環境を判定する
    ///
    /// # 判定ロジック
    /// 1. "production" ならプロダクション、それ以外の値は開発環境
    /// 2. 未設定の場合、デバッグビルドは開発環境、リリースビルドはプロダクション
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Environment::Production,
            Some(_) => Environment::Development,
            None if cfg!(debug_assertions) => Environment::Development,
            None => Environment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_subscriptions.db"
/// - プロダクション環境: "subscriptions.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_subscriptions.db",
        Environment::Production => "subscriptions.db",
    }
}

/// サーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub environment: Environment,
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub log_level: String,
}

impl ServerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む
    ///
    /// # 引数
    /// * `lookup` - 変数名から値を返す関数（空文字列は未設定として扱う）
    ///
    /// # 戻り値
    /// 設定、またはホスト・ポートが不正な場合は設定エラー
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = Environment::from_value(get("ENVIRONMENT").as_deref());

        let host = match get("APP_HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| AppError::configuration(format!("APP_HOST が不正です: {raw} ({e})")))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match get("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::configuration(format!("APP_PORT が不正です: {raw} ({e})")))?,
            None => 8080,
        };

        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(get_database_filename(environment)));

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| match environment {
            Environment::Production => "info".to_string(),
            Environment::Development => "debug".to_string(),
        });

        Ok(Self {
            environment,
            host,
            port,
            database_path,
            log_level,
        })
    }

    /// 待ち受けアドレス
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// 本番環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_get_database_filename() {
        assert_eq!(
            get_database_filename(Environment::Development),
            "dev_subscriptions.db"
        );
        assert_eq!(
            get_database_filename(Environment::Production),
            "subscriptions.db"
        );
    }

    #[test]
    fn test_environment_from_value() {
        assert_eq!(
            Environment::from_value(Some("production")),
            Environment::Production
        );
        assert_eq!(
            Environment::from_value(Some("staging")),
            Environment::Development
        );
        // 未設定の場合はビルド設定に依存する
        assert!(matches!(
            Environment::from_value(None),
            Environment::Development | Environment::Production
        ));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("ENVIRONMENT", "development")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("dev_subscriptions.db"));
        assert_eq!(config.log_level, "debug");
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_values() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9090"),
            ("DATABASE_PATH", "/var/lib/subscriptions/app.db"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.bind_address().to_string(), "127.0.0.1:9090");
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/subscriptions/app.db")
        );
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            config_from(&[("APP_PORT", "eighty")]),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            config_from(&[("APP_PORT", "70000")]),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = config_from(&[("ENVIRONMENT", "development"), ("APP_PORT", "")]).unwrap();
        assert_eq!(config.port, 8080);
    }
}
