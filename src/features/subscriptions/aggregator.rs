//! 期間内のサブスクリプション費用の集計
//!
//! 各サブスクリプションの有効期間と集計期間が重なる月数を暦月単位で求め、
//! 月額を掛けて合計する。入力のスナップショットだけに依存する純粋関数で、
//! 呼び出し間で共有する状態は持たない。

use super::models::{Subscription, SubscriptionFilter};
use super::period::{expand_period, months_between, PeriodError, QueryPeriod};
use uuid::Uuid;

/// サブスクリプションが集計期間と重なるかを判定する
///
/// 開始月が期間の終わり以前で、かつ終了月がない（継続中）か
/// 期間の始まり以降であれば対象になる。
pub fn is_eligible(subscription: &Subscription, period: &QueryPeriod) -> bool {
    let started_in_time = subscription.start_date.and_time(chrono::NaiveTime::MIN) <= period.end;
    let still_active = subscription
        .end_date
        .map_or(true, |end| end.and_time(chrono::NaiveTime::MIN) >= period.start);
    started_in_time && still_active
}

/// 集計期間内で課金対象となる月数を返す
///
/// 次の4つの最小値（負の場合は0）:
/// 1. サブスクリプション開始月から期間終了月まで（両端を含む）
/// 2. 期間開始月からサブスクリプション終了月まで（両端を含む、終了月がなければ上限なし）
/// 3. 期間そのものの月数（両端を含む）
/// 4. サブスクリプション自体の月数（両端を含む、終了月がなければ上限なし）
pub fn overlap_months(subscription: &Subscription, period: &QueryPeriod) -> u64 {
    let since_start = months_between(&period.end, &subscription.start_date) + 1;
    let until_end = subscription
        .end_date
        .map_or(i64::MAX, |end| months_between(&end, &period.start) + 1);
    let period_width = months_between(&period.end, &period.start) + 1;
    let own_length = subscription
        .end_date
        .map_or(i64::MAX, |end| months_between(&end, &subscription.start_date) + 1);

    let months = since_start
        .min(until_end)
        .min(period_width)
        .min(own_length)
        .max(0);
    u64::try_from(months).unwrap_or(0)
}

/// 展開済みの期間に対して合計金額を計算する
///
/// # 引数
/// * `subscriptions` - 集計対象のスナップショット
/// * `period` - 集計期間
/// * `filter` - 契約者・サービス名での絞り込み
///
/// # 戻り値
/// 合計金額（一致するものがなければ0）
pub fn compute_total(
    subscriptions: &[Subscription],
    period: &QueryPeriod,
    filter: &SubscriptionFilter,
) -> u64 {
    subscriptions
        .iter()
        .filter(|sub| filter.matches(sub))
        .filter(|sub| is_eligible(sub, period))
        .map(|sub| u64::from(sub.monthly_cost) * overlap_months(sub, period))
        .sum()
}

/// "MM-YYYY" 形式の期間を受け取り、合計金額を計算する
///
/// # 引数
/// * `records` - 集計対象のスナップショット
/// * `start_token` - 期間の開始月（MM-YYYY）
/// * `end_token` - 期間の終了月（MM-YYYY）
/// * `owner_filter` - 契約者IDでの絞り込み（任意）
/// * `service_filter` - サービス名での絞り込み（任意、空文字は条件なし）
///
/// # 戻り値
/// 合計金額、または期間の形式が不正な場合は `PeriodError`
pub fn compute_total_cost(
    records: &[Subscription],
    start_token: &str,
    end_token: &str,
    owner_filter: Option<Uuid>,
    service_filter: Option<&str>,
) -> Result<u64, PeriodError> {
    let period = expand_period(start_token, end_token)?;
    let filter = SubscriptionFilter::new(owner_filter, service_filter.map(str::to_string));
    Ok(compute_total(records, &period, &filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::period::parse_month;
    use chrono::Utc;
    use quickcheck_macros::quickcheck;

    fn subscription(service: &str, cost: u32, start: &str, end: Option<&str>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            service_name: service.to_string(),
            monthly_cost: cost,
            user_id: Uuid::new_v4(),
            start_date: parse_month(start).unwrap(),
            end_date: end.map(|token| parse_month(token).unwrap()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_ended_capped_by_own_start() {
        // 3月開始・継続中を1〜5月で集計すると3〜5月の3か月分
        let records = vec![subscription("Kinopoisk", 100, "03-2024", None)];
        let total = compute_total_cost(&records, "01-2024", "05-2024", None, None).unwrap();
        assert_eq!(total, 300);
    }

    #[test]
    fn test_closed_subscription_capped_by_own_end() {
        // 2023年6月〜2024年2月を2024年通年で集計すると1〜2月の2か月分
        let records = vec![subscription("Okko", 50, "06-2023", Some("02-2024"))];
        let total = compute_total_cost(&records, "01-2024", "12-2024", None, None).unwrap();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_subscription_inside_period_charged_for_own_duration() {
        // 3〜4月のサブスクリプションを1〜5月で集計すると2か月分
        let records = vec![subscription("Ivi", 100, "03-2024", Some("04-2024"))];
        let total = compute_total_cost(&records, "01-2024", "05-2024", None, None).unwrap();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_single_month_subscription_charged_once() {
        let records = vec![subscription("Ivi", 100, "03-2024", Some("03-2024"))];
        let total = compute_total_cost(&records, "01-2024", "05-2024", None, None).unwrap();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_single_month_query_charges_one_month() {
        let records = vec![subscription("Spotify", 250, "01-2024", Some("12-2024"))];
        let total = compute_total_cost(&records, "01-2024", "01-2024", None, None).unwrap();
        assert_eq!(total, 250);
    }

    #[test]
    fn test_subscription_spanning_whole_period_capped_by_width() {
        let records = vec![subscription("Spotify", 10, "01-2020", None)];
        let total = compute_total_cost(&records, "03-2024", "08-2024", None, None).unwrap();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_subscriptions_outside_period_are_ignored() {
        let records = vec![
            subscription("Before", 100, "01-2023", Some("12-2023")),
            subscription("After", 100, "06-2024", None),
        ];
        let total = compute_total_cost(&records, "01-2024", "05-2024", None, None).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_boundary_months_are_inclusive() {
        // 終了月が期間の開始月と同じ、開始月が期間の終了月と同じ
        let records = vec![
            subscription("EndsOnStart", 10, "06-2023", Some("01-2024")),
            subscription("StartsOnEnd", 20, "05-2024", None),
        ];
        let total = compute_total_cost(&records, "01-2024", "05-2024", None, None).unwrap();
        assert_eq!(total, 10 + 20);
    }

    #[test]
    fn test_service_filter_selects_single_subscription() {
        let records = vec![
            subscription("Netflix", 800, "01-2024", None),
            subscription("Yandex Plus", 300, "01-2024", None),
        ];
        let total =
            compute_total_cost(&records, "01-2024", "03-2024", None, Some("Netflix")).unwrap();
        assert_eq!(total, 800 * 3);

        let unfiltered =
            compute_total_cost(&records, "01-2024", "03-2024", None, Some("")).unwrap();
        assert_eq!(unfiltered, (800 + 300) * 3);
    }

    #[test]
    fn test_owner_filter() {
        let mut mine = subscription("Netflix", 800, "01-2024", None);
        let owner = Uuid::new_v4();
        mine.user_id = owner;
        let records = vec![mine, subscription("Netflix", 800, "01-2024", None)];

        let total = compute_total_cost(&records, "01-2024", "01-2024", Some(owner), None).unwrap();
        assert_eq!(total, 800);
    }

    #[test]
    fn test_empty_records_yield_zero() {
        assert_eq!(compute_total_cost(&[], "01-2024", "12-2024", None, None).unwrap(), 0);
    }

    #[test]
    fn test_inverted_period_yields_zero() {
        let records = vec![subscription("Netflix", 800, "01-2020", None)];
        let total = compute_total_cost(&records, "05-2024", "01-2024", None, None).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_invalid_tokens_fail_before_aggregation() {
        let records = vec![subscription("Netflix", 800, "01-2024", None)];
        assert_eq!(
            compute_total_cost(&records, "2024-01", "05-2024", None, None),
            Err(PeriodError::InvalidFormat("2024-01".to_string()))
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let records = vec![
            subscription("Netflix", 800, "11-2023", Some("04-2024")),
            subscription("Okko", 199, "02-2024", None),
        ];
        let first = compute_total_cost(&records, "01-2024", "06-2024", None, None).unwrap();
        let second = compute_total_cost(&records, "01-2024", "06-2024", None, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 800 * 4 + 199 * 5);
    }

    /// 2020年1月を0とした通し番号から "MM-YYYY" を作る
    fn month_token(index: u32) -> String {
        format!("{:02}-{:04}", index % 12 + 1, 2020 + index / 12)
    }

    #[quickcheck]
    fn prop_overlap_matches_month_by_month_count(
        sub_start: u8,
        sub_length: Option<u8>,
        period_start: u8,
        period_length: u8,
    ) -> bool {
        let sub_start = u32::from(sub_start % 60);
        let sub_end = sub_length.map(|length| sub_start + u32::from(length % 24));
        let period_start = u32::from(period_start % 60);
        let period_end = period_start + u32::from(period_length % 24);

        let record = subscription(
            "Netflix",
            1,
            &month_token(sub_start),
            sub_end.map(month_token).as_deref(),
        );
        let period = expand_period(&month_token(period_start), &month_token(period_end)).unwrap();

        // 期間内の各月について、サブスクリプションが有効かを数える
        let expected = (period_start..=period_end)
            .filter(|month| *month >= sub_start && sub_end.map_or(true, |end| *month <= end))
            .count() as u64;

        compute_total(&[record], &period, &SubscriptionFilter::default()) == expected
    }
}
