use super::period::format_month;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Europe::Moscow;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// サブスクリプションデータモデル
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String, // サービス名（空文字不可）
    pub monthly_cost: u32,    // 月額（正の整数）
    pub user_id: Uuid,        // 契約者ID（存在確認はしない）
    #[serde(serialize_with = "serialize_month")]
    pub start_date: NaiveDate, // 月初に正規化
    #[serde(
        serialize_with = "serialize_optional_month",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>, // Noneは継続中
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// ストアに渡す検証済みのサブスクリプション内容
///
/// 作成時と更新時（全項目置き換え）の両方で使用する。
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub monthly_cost: u32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// サブスクリプション作成用DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionDto {
    pub service_name: String,
    pub monthly_cost: i64,
    pub user_id: Uuid,
    pub start_date: String,       // MM-YYYY形式
    pub end_date: Option<String>, // MM-YYYY形式、省略可
}

/// サブスクリプション更新用DTO（全項目置き換えのため作成用と同じ形）
pub type UpdateSubscriptionDto = CreateSubscriptionDto;

/// 一覧取得・集計で使う絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl SubscriptionFilter {
    /// 絞り込み条件を作成する（空のサービス名は条件なしとして扱う）
    pub fn new(user_id: Option<Uuid>, service_name: Option<String>) -> Self {
        Self {
            user_id,
            service_name: service_name.filter(|name| !name.is_empty()),
        }
    }

    /// サブスクリプションが条件に一致するかを判定する
    pub fn matches(&self, subscription: &Subscription) -> bool {
        let user_ok = self
            .user_id
            .map_or(true, |user_id| subscription.user_id == user_id);
        let service_ok = match self.service_name.as_deref() {
            None | Some("") => true,
            Some(name) => subscription.service_name == name,
        };
        user_ok && service_ok
    }
}

/// 合計金額の集計条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start_period: String, // MM-YYYY形式
    pub end_period: String,   // MM-YYYY形式
}

impl SummaryQuery {
    /// 集計条件に含まれる絞り込み条件を取り出す
    pub fn filter(&self) -> SubscriptionFilter {
        SubscriptionFilter::new(self.user_id, self.service_name.clone())
    }
}

/// 合計金額の集計結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total_cost: u64,
}

fn serialize_month<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_month(*date))
}

fn serialize_optional_month<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_month(date, serializer),
        None => serializer.serialize_none(),
    }
}

/// タイムスタンプはモスクワ時間の "YYYY-MM-DD HH:MM:SS" で返す
fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let local = timestamp.with_timezone(&Moscow);
    serializer.serialize_str(&local.format("%Y-%m-%d %H:%M:%S").to_string())
}
