/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - 月単位の期間（MM-YYYY）の解析と検証
/// - 期間内の費用の按分集計
/// - サブスクリプションの作成、読み取り、更新、削除
/// - HTTPハンドラー
pub mod aggregator;
pub mod handlers;
pub mod models;
pub mod period;
pub mod repository;
pub mod service;
pub mod store;

// 公開インターフェース
pub use aggregator::{compute_total, compute_total_cost, overlap_months};
pub use models::{
    CreateSubscriptionDto, NewSubscription, Subscription, SubscriptionFilter, SummaryQuery,
    SummaryResponse, UpdateSubscriptionDto,
};
pub use period::{
    expand_period, format_month, months_between, parse_month, parse_optional_month,
    parse_period_boundary, validate_range, PeriodError, QueryPeriod,
};
pub use service::SubscriptionService;
pub use store::{InMemorySubscriptionStore, SqliteSubscriptionStore, SubscriptionStore};
