use crate::shared::errors::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

/// クエリ文字列を解析したもの
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// クエリ文字列（`?` を除いた部分）を解析する
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self(pairs)
    }

    /// 値を取得する（空文字列は未指定として扱う）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// UUIDとして値を取得する
    ///
    /// # 戻り値
    /// 未指定ならNone、形式不正ならバリデーションエラー
    pub fn get_uuid(&self, key: &str) -> AppResult<Option<Uuid>> {
        self.get(key)
            .map(|raw| parse_uuid(raw, key))
            .transpose()
    }
}

/// パスやクエリのIDをUUIDとして解析する
pub fn parse_uuid(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation(format!("{field} の形式が不正です")))
}

/// JSONのリクエストボディを解析する
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    if body.is_empty() {
        return Err(AppError::validation("リクエストボディが空です"));
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    #[test]
    fn test_query_params() {
        let params = QueryParams::parse(Some(
            "start_period=01-2024&service_name=Yandex%20Plus&empty=",
        ));

        assert_eq!(params.get("start_period"), Some("01-2024"));
        assert_eq!(params.get("service_name"), Some("Yandex Plus"));
        assert_eq!(params.get("empty"), None);
        assert_eq!(params.get("missing"), None);
        assert_eq!(QueryParams::parse(None), QueryParams::default());
    }

    #[test]
    fn test_get_uuid() {
        let id = Uuid::new_v4();
        let params = QueryParams::parse(Some(format!("user_id={id}&bad=xyz").as_str()));

        assert_eq!(params.get_uuid("user_id").unwrap(), Some(id));
        assert_eq!(params.get_uuid("missing").unwrap(), None);
        assert!(matches!(params.get_uuid("bad"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_json_body() {
        let payload: Payload = parse_json_body(br#"{"name":"Okko"}"#).unwrap();
        assert_eq!(payload.name, "Okko");

        assert!(matches!(
            parse_json_body::<Payload>(b""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_json_body::<Payload>(b"{not json"),
            Err(AppError::Json(_))
        ));
    }
}
