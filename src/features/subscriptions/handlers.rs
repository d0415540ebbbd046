use super::models::{
    CreateSubscriptionDto, SubscriptionFilter, SummaryQuery, UpdateSubscriptionDto,
};
use super::service::SubscriptionService;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::http::request::{parse_json_body, parse_uuid, QueryParams};
use crate::shared::http::response::{
    error_response, json_response, message_response, HttpResponse,
};
use hyper::StatusCode;

/// サブスクリプションを作成する
///
/// `POST /api/v1/subscriptions`
pub fn create_subscription(service: &SubscriptionService, body: &[u8]) -> HttpResponse {
    let result = parse_json_body::<CreateSubscriptionDto>(body)
        .and_then(|dto| service.create_subscription(dto));

    match result {
        Ok(subscription) => json_response(StatusCode::CREATED, &subscription),
        Err(e) => error_response(&e),
    }
}

/// サブスクリプションを取得する
///
/// `GET /api/v1/subscriptions/{id}`
pub fn get_subscription(service: &SubscriptionService, raw_id: &str) -> HttpResponse {
    let result = parse_subscription_id(raw_id).and_then(|id| service.get_subscription(id));

    match result {
        Ok(subscription) => json_response(StatusCode::OK, &subscription),
        Err(e) => error_response(&e),
    }
}

/// サブスクリプションを更新する（全項目置き換え）
///
/// `PUT /api/v1/subscriptions/{id}`
pub fn update_subscription(
    service: &SubscriptionService,
    raw_id: &str,
    body: &[u8],
) -> HttpResponse {
    let result = parse_subscription_id(raw_id).and_then(|id| {
        let dto = parse_json_body::<UpdateSubscriptionDto>(body)?;
        service.update_subscription(id, dto)
    });

    match result {
        Ok(_) => message_response(StatusCode::OK, "subscription updated successfully"),
        Err(e) => error_response(&e),
    }
}

/// サブスクリプションを削除する
///
/// `DELETE /api/v1/subscriptions/{id}`
pub fn delete_subscription(service: &SubscriptionService, raw_id: &str) -> HttpResponse {
    let result = parse_subscription_id(raw_id).and_then(|id| service.delete_subscription(id));

    match result {
        Ok(()) => message_response(StatusCode::OK, "subscription deleted successfully"),
        Err(e) => error_response(&e),
    }
}

/// サブスクリプション一覧を取得する
///
/// `GET /api/v1/subscriptions?user_id=&service_name=`
pub fn list_subscriptions(service: &SubscriptionService, params: &QueryParams) -> HttpResponse {
    let result = params.get_uuid("user_id").and_then(|user_id| {
        let filter =
            SubscriptionFilter::new(user_id, params.get("service_name").map(str::to_string));
        service.list_subscriptions(&filter)
    });

    match result {
        Ok(subscriptions) => json_response(StatusCode::OK, &subscriptions),
        Err(e) => error_response(&e),
    }
}

/// 期間内の合計金額を計算する
///
/// `GET /api/v1/subscriptions/summary?start_period=&end_period=&user_id=&service_name=`
pub fn calculate_total_cost(service: &SubscriptionService, params: &QueryParams) -> HttpResponse {
    let result = summary_query(params).and_then(|query| service.calculate_total_cost(&query));

    match result {
        Ok(summary) => json_response(StatusCode::OK, &summary),
        Err(e) => error_response(&e),
    }
}

fn parse_subscription_id(raw_id: &str) -> AppResult<uuid::Uuid> {
    parse_uuid(raw_id, "subscription id")
}

/// クエリパラメータから集計条件を組み立てる
fn summary_query(params: &QueryParams) -> AppResult<SummaryQuery> {
    let user_id = params.get_uuid("user_id")?;

    let (Some(start_period), Some(end_period)) =
        (params.get("start_period"), params.get("end_period"))
    else {
        return Err(AppError::validation("start_period と end_period は必須です"));
    };

    Ok(SummaryQuery {
        user_id,
        service_name: params.get("service_name").map(str::to_string),
        start_period: start_period.to_string(),
        end_period: end_period.to_string(),
    })
}
