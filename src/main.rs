#[tokio::main]
async fn main() {
    if let Err(e) = subscription_service_lib::run().await {
        log::error!("サーバーの実行中にエラーが発生しました: {e}");
        eprintln!("サーバーの実行中にエラーが発生しました: {e}");
        std::process::exit(1);
    }
}
