use crate::shared::errors::AppError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

/// HTTPレスポンスの型
pub type HttpResponse = Response<Full<Bytes>>;

/// エラーレスポンスの本文
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 成功メッセージのレスポンス本文
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// 値をJSONにしてレスポンスを作成する
///
/// # 引数
/// * `status` - HTTPステータス
/// * `value` - レスポンス本文
///
/// # 戻り値
/// JSONレスポンス（シリアライズに失敗した場合は500）
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => build(status, body),
        Err(e) => {
            log::error!("レスポンスのシリアライズに失敗しました: {e}");
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"internal server error"}"#.to_vec(),
            )
        }
    }
}

/// エラーからレスポンスを作成する
pub fn error_response(error: &AppError) -> HttpResponse {
    json_response(
        error.status_code(),
        &ErrorResponse {
            error: error.user_message(),
        },
    )
}

/// 成功メッセージのレスポンスを作成する
pub fn message_response(status: StatusCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &SuccessResponse {
            message: message.to_string(),
        },
    )
}

/// 本文なしのレスポンスを作成する
pub fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// CORSヘッダーを付与する
pub fn with_cors_headers(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(
            "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization, accept, origin, Cache-Control, X-Requested-With",
        ),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("POST, OPTIONS, GET, PUT, DELETE"),
    );
    response
}

fn build(status: StatusCode, body: Vec<u8>) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}
