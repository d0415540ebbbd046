use super::environment::ServerConfig;
use log::{info, warn, LevelFilter};

/// .envファイルから環境変数を読み込む
///
/// ファイルがない場合は警告のみ出し、既に設定されている環境変数を使う。
///
/// # 戻り値
/// .envファイルを読み込んだ場合はtrue
pub fn load_environment_variables() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            eprintln!(".envファイルを読み込みました: {:?}", path);
            true
        }
        Err(_) => {
            eprintln!(".envファイルが見つかりません。環境変数が直接設定されていることを確認してください。");
            false
        }
    }
}

/// ログレベルの文字列を解析する（不明な値は Info）
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// ログシステムを初期化
///
/// 二重に初期化された場合は警告を出して既存のロガーを使い続ける。
pub fn initialize_logging_system(config: &ServerConfig) {
    let level = parse_log_level(&config.log_level);

    let result = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if result.is_err() {
        warn!("ログシステムは既に初期化されています");
        return;
    }

    info!(
        "ログシステムを初期化しました: level={}, environment={}",
        config.log_level,
        config.environment.as_str()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("error"), LevelFilter::Error);
        assert_eq!(parse_log_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_log_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_log_level("verbose"), LevelFilter::Info);
    }

    #[test]
    fn test_initialize_logging_twice_does_not_panic() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        initialize_logging_system(&config);
        initialize_logging_system(&config);
    }
}
