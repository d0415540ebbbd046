pub mod features;
pub mod shared;

use features::subscriptions::{SqliteSubscriptionStore, SubscriptionService};
use log::{error, info};
use shared::config::{initialize_logging_system, load_environment_variables, ServerConfig};
use shared::database::initialize_database;
use shared::errors::AppResult;
use std::sync::Arc;

/// サーバーを起動し、Ctrl-Cを受け取るまで処理を続ける
///
/// # 処理内容
/// 1. .envファイルと環境変数から設定を読み込む
/// 2. ログシステムを初期化する
/// 3. データベースを初期化する
/// 4. ストア・サービスを組み立ててHTTPサーバーを起動する
pub async fn run() -> AppResult<()> {
    load_environment_variables();
    let config = ServerConfig::from_env()?;

    initialize_logging_system(&config);
    info!(
        "サブスクリプションサービスを起動します: port={}, log_level={}",
        config.port, config.log_level
    );

    info!("データベースを初期化しています...");
    let conn = initialize_database(&config.database_path).map_err(|e| {
        error!("データベースの初期化に失敗しました: {e}");
        e
    })?;

    let store = Arc::new(SqliteSubscriptionStore::new(conn));
    let service = SubscriptionService::new(store);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("サーバーを開始しました: http://{}", listener.local_addr()?);

    shared::http::serve(listener, service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("停止シグナルの待ち受けに失敗しました: {e}");
        }
    })
    .await;

    info!("サーバーを停止しました");
    Ok(())
}
