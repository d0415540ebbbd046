//! ヘルスチェック機能モジュール
use crate::shared::http::response::{json_response, HttpResponse};
use chrono::Utc;
use chrono_tz::Europe::Moscow;
use hyper::StatusCode;
use serde::Serialize;

/// サービス名
pub const SERVICE_NAME: &str = "subscription-service";

/// ヘルスチェックのレスポンス本文
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub timezone: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl HealthStatus {
    /// 現在時刻で稼働状態を作成する
    pub fn current() -> Self {
        let now = Utc::now().with_timezone(&Moscow);
        Self {
            status: "ok",
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            timezone: "Europe/Moscow",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// `GET /health`
pub fn health_check() -> HttpResponse {
    json_response(StatusCode::OK, &HealthStatus::current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], SERVICE_NAME);
        assert_eq!(json["timezone"], "Europe/Moscow");
        assert_eq!(json["timestamp"].as_str().unwrap().len(), 19);
    }
}
