use super::aggregator::compute_total;
use super::models::{
    CreateSubscriptionDto, NewSubscription, Subscription, SubscriptionFilter, SummaryQuery,
    SummaryResponse, UpdateSubscriptionDto,
};
use super::period::{expand_period, parse_month, parse_optional_month, validate_range};
use super::store::SubscriptionStore;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// サービス名の最大文字数
const MAX_SERVICE_NAME_LENGTH: usize = 255;

/// サブスクリプションのライフサイクルと費用集計を扱うサービス
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    /// 新しいサービスを作成する
    ///
    /// # 引数
    /// * `store` - サブスクリプションの保存先
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// サブスクリプションを作成する
    ///
    /// # 引数
    /// * `dto` - サブスクリプション作成用DTO
    ///
    /// # 戻り値
    /// 作成されたサブスクリプション、または失敗時はエラー
    pub fn create_subscription(&self, dto: CreateSubscriptionDto) -> AppResult<Subscription> {
        info!(
            "サブスクリプションを作成します: user_id={}, service_name={}, monthly_cost={}",
            dto.user_id, dto.service_name, dto.monthly_cost
        );

        let new = validate_subscription_dto(&dto).map_err(|e| {
            e.log("サブスクリプション作成の入力が不正です");
            e
        })?;

        let subscription = self.store.create(&new).map_err(|e| {
            e.log(&format!(
                "サブスクリプションの保存に失敗しました: user_id={}",
                new.user_id
            ));
            e
        })?;

        info!(
            "サブスクリプションを作成しました: subscription_id={}, user_id={}",
            subscription.id, subscription.user_id
        );
        Ok(subscription)
    }

    /// IDでサブスクリプションを取得する
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    ///
    /// # 戻り値
    /// サブスクリプション、または存在しない場合は `AppError::NotFound`
    pub fn get_subscription(&self, id: Uuid) -> AppResult<Subscription> {
        debug!("サブスクリプションを取得します: subscription_id={id}");

        let subscription = self
            .store
            .find_by_id(id)
            .map_err(|e| log_store_error("取得", id, e))?;

        debug!(
            "サブスクリプションを取得しました: subscription_id={id}, service_name={}",
            subscription.service_name
        );
        Ok(subscription)
    }

    /// サブスクリプションを更新する（全項目置き換え）
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    /// * `dto` - サブスクリプション更新用DTO
    ///
    /// # 戻り値
    /// 更新されたサブスクリプション、または失敗時はエラー
    pub fn update_subscription(
        &self,
        id: Uuid,
        dto: UpdateSubscriptionDto,
    ) -> AppResult<Subscription> {
        info!("サブスクリプションを更新します: subscription_id={id}");

        let new = validate_subscription_dto(&dto).map_err(|e| {
            e.log(&format!(
                "サブスクリプション更新の入力が不正です: subscription_id={id}"
            ));
            e
        })?;

        let subscription = self
            .store
            .update(id, &new)
            .map_err(|e| log_store_error("更新", id, e))?;

        info!("サブスクリプションを更新しました: subscription_id={id}");
        Ok(subscription)
    }

    /// サブスクリプションを削除する
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    ///
    /// # 戻り値
    /// 成功時はOk(())、存在しない場合は `AppError::NotFound`
    pub fn delete_subscription(&self, id: Uuid) -> AppResult<()> {
        info!("サブスクリプションを削除します: subscription_id={id}");

        self.store
            .delete(id)
            .map_err(|e| log_store_error("削除", id, e))?;

        info!("サブスクリプションを削除しました: subscription_id={id}");
        Ok(())
    }

    /// サブスクリプション一覧を取得する
    ///
    /// # 引数
    /// * `filter` - 契約者・サービス名での絞り込み
    ///
    /// # 戻り値
    /// 作成日時の新しい順の一覧、または失敗時はエラー
    pub fn list_subscriptions(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        debug!(
            "サブスクリプション一覧を取得します: user_id={:?}, service_name={:?}",
            filter.user_id, filter.service_name
        );

        let subscriptions = self.store.list(filter).map_err(|e| {
            e.log("サブスクリプション一覧の取得に失敗しました");
            e
        })?;

        debug!(
            "サブスクリプション一覧を取得しました: count={}, user_id={:?}",
            subscriptions.len(),
            filter.user_id
        );
        Ok(subscriptions)
    }

    /// 期間内のサブスクリプション費用の合計を計算する
    ///
    /// # 引数
    /// * `query` - 期間（MM-YYYY）と絞り込み条件
    ///
    /// # 戻り値
    /// 合計金額、または期間の形式が不正な場合は `AppError::Period`
    pub fn calculate_total_cost(&self, query: &SummaryQuery) -> AppResult<SummaryResponse> {
        info!(
            "合計金額を計算します: start_period={}, end_period={}, user_id={:?}, service_name={:?}",
            query.start_period, query.end_period, query.user_id, query.service_name
        );

        // 期間の形式エラーはストアを読む前に返す
        let period = expand_period(&query.start_period, &query.end_period).map_err(|e| {
            let e = AppError::from(e);
            e.log("集計期間が不正です");
            e
        })?;

        if period.end < period.start {
            warn!(
                "集計期間の開始と終了が逆転しています（合計は0になります）: start_period={}, end_period={}",
                query.start_period, query.end_period
            );
        }

        let filter = query.filter();
        let snapshot = self.store.list(&filter).map_err(|e| {
            e.log("集計対象の取得に失敗しました");
            e
        })?;

        let total_cost = compute_total(&snapshot, &period, &filter);

        info!(
            "合計金額を計算しました: total_cost={total_cost}, start_period={}, end_period={}",
            query.start_period, query.end_period
        );
        Ok(SummaryResponse { total_cost })
    }
}

/// ストアのエラーを重要度に応じてログ出力する
fn log_store_error(action: &str, id: Uuid, error: AppError) -> AppError {
    error.log(&format!(
        "サブスクリプションの{action}に失敗しました: subscription_id={id}"
    ));
    error
}

/// 作成・更新DTOを検証し、保存用の内容に変換する
///
/// # 引数
/// * `dto` - サブスクリプション作成・更新用DTO
///
/// # 戻り値
/// 検証済みの内容、または失敗時はエラー
fn validate_subscription_dto(dto: &CreateSubscriptionDto) -> AppResult<NewSubscription> {
    // バリデーション: サービス名は必須
    let service_name = dto.service_name.trim();
    if service_name.is_empty() {
        return Err(AppError::validation("サービス名を入力してください"));
    }

    // バリデーション: サービス名の長さ
    if service_name.chars().count() > MAX_SERVICE_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "サービス名は{MAX_SERVICE_NAME_LENGTH}文字以内で入力してください"
        )));
    }

    // バリデーション: 月額は正の整数
    if dto.monthly_cost < 1 {
        return Err(AppError::validation("月額は1以上の整数である必要があります"));
    }
    let monthly_cost = u32::try_from(dto.monthly_cost)
        .map_err(|_| AppError::validation("月額が大きすぎます"))?;

    // バリデーション: 日付形式と前後関係
    let start_date = parse_month(&dto.start_date)?;
    let end_date = parse_optional_month(dto.end_date.as_deref())?;
    validate_range(Some(start_date), end_date)?;

    Ok(NewSubscription {
        service_name: service_name.to_string(),
        monthly_cost,
        user_id: dto.user_id,
        start_date,
        end_date,
    })
}
