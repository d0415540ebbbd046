use super::request::QueryParams;
use super::response::{
    empty_response, error_response, json_response, with_cors_headers, ErrorResponse,
    HttpResponse,
};
use crate::features::health::health_check;
use crate::features::subscriptions::{handlers, SubscriptionService};
use crate::shared::errors::AppError;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};

/// リクエストボディの上限（バイト）
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// 未対応のエンドポイントに返す本文
#[derive(Debug, Serialize)]
struct RouteNotFound {
    error: &'static str,
    message: &'static str,
}

/// 接続を受け付け、停止シグナルを受け取るまでリクエストを処理する
///
/// # 引数
/// * `listener` - バインド済みのTCPリスナー
/// * `service` - サブスクリプションサービス
/// * `shutdown` - 完了するとサーバーを停止するフューチャー
pub async fn serve<F>(listener: TcpListener, service: SubscriptionService, shutdown: F)
where
    F: Future<Output = ()>,
{
    let service = Arc::new(service);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        handle_connection(stream, remote, service).await;
                    });
                }
                Err(e) => {
                    // 一時的なエラー（ファイルディスクリプタ枯渇など）では停止しない
                    log::error!("接続受け入れエラー: {e}");
                }
            },
            _ = &mut shutdown => {
                log::info!("停止シグナルを受信しました。新しい接続の受け付けを終了します");
                break;
            }
        }
    }
}

/// TCP接続を処理する
async fn handle_connection(
    stream: TcpStream,
    remote: SocketAddr,
    service: Arc<SubscriptionService>,
) {
    let io = TokioIo::new(stream);

    let handler = service_fn(move |req| handle_request(req, Arc::clone(&service), Some(remote)));

    if let Err(err) = http1::Builder::new().serve_connection(io, handler).await {
        log::error!("HTTP接続処理エラー: {err}");
    }
}

/// HTTPリクエストを処理する
///
/// ルーティング、CORSヘッダーの付与、アクセスログの出力を行う。
pub async fn handle_request<B>(
    req: Request<B>,
    service: Arc<SubscriptionService>,
    remote: Option<SocketAddr>,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let response = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => {
            let params = QueryParams::parse(parts.uri.query());
            route(&method, &path, &params, &collected.to_bytes(), &service)
        }
        Err(e) if e.is::<LengthLimitError>() => {
            log::warn!("リクエストボディが上限を超えています: limit={MAX_BODY_BYTES}");
            json_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &ErrorResponse {
                    error: format!("リクエストボディは{MAX_BODY_BYTES}バイト以内にしてください"),
                },
            )
        }
        Err(e) => {
            log::warn!("リクエストボディの読み込みに失敗しました: {e}");
            error_response(&AppError::validation("リクエストボディを読み込めません"))
        }
    };

    let response = with_cors_headers(response);

    log::info!(
        "HTTP request: method={} path={} status={} duration_ms={} client_ip={}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis(),
        remote.map_or_else(|| "-".to_string(), |addr| addr.ip().to_string())
    );

    Ok(response)
}

/// メソッドとパスからハンドラーを選ぶ
fn route(
    method: &Method,
    path: &str,
    params: &QueryParams,
    body: &Bytes,
    service: &SubscriptionService,
) -> HttpResponse {
    if method == Method::OPTIONS {
        return empty_response(StatusCode::NO_CONTENT);
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        (&Method::GET, ["health"]) => health_check(),
        (&Method::POST, ["api", "v1", "subscriptions"]) => {
            handlers::create_subscription(service, body)
        }
        (&Method::GET, ["api", "v1", "subscriptions"]) => {
            handlers::list_subscriptions(service, params)
        }
        (&Method::GET, ["api", "v1", "subscriptions", "summary"]) => {
            handlers::calculate_total_cost(service, params)
        }
        (&Method::GET, ["api", "v1", "subscriptions", id]) => {
            handlers::get_subscription(service, id)
        }
        (&Method::PUT, ["api", "v1", "subscriptions", id]) => {
            handlers::update_subscription(service, id, body)
        }
        (&Method::DELETE, ["api", "v1", "subscriptions", id]) => {
            handlers::delete_subscription(service, id)
        }
        _ => {
            log::warn!("未対応のエンドポイント: {method} {path}");
            json_response(
                StatusCode::NOT_FOUND,
                &RouteNotFound {
                    error: "endpoint not found",
                    message: "use /api/v1/subscriptions for subscriptions API",
                },
            )
        }
    }
}
