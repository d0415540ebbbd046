//! 月単位の期間（"MM-YYYY"）を扱うモジュール
//!
//! 請求は常に暦月単位で行われるため、日付はすべて月初に正規化する。
//! このモジュールの関数はすべて純粋関数で、ログ出力や共有状態を持たない。

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// "MM-YYYY" 形式（2桁の月、4桁の年）
static MONTH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})-(\d{4})$").expect("月トークンの正規表現が不正です"));

/// 期間の解析・検証で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// トークンが空、形式不正、または月が範囲外
    #[error("日付の形式が不正です（MM-YYYY形式で指定してください）: '{0}'")]
    InvalidFormat(String),

    /// 終了月が開始月より前
    #[error("終了月 {end} が開始月 {start} より前です")]
    InvalidRange { start: String, end: String },

    /// 開始月が未設定
    #[error("開始月は必須です")]
    MissingStart,
}

/// 集計対象の期間
///
/// `start` は開始月の1日 00:00:00、`end` は終了月の末日 23:59:59。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// "MM-YYYY" を解析し、その月の1日を返す
///
/// # 引数
/// * `token` - "MM-YYYY" 形式の文字列
///
/// # 戻り値
/// 月初の日付、または形式不正時は `PeriodError::InvalidFormat`
pub fn parse_month(token: &str) -> Result<NaiveDate, PeriodError> {
    let invalid = || PeriodError::InvalidFormat(token.to_string());

    let caps = MONTH_TOKEN.captures(token).ok_or_else(invalid)?;
    let month: u32 = caps[1].parse().map_err(|_| invalid())?;
    let year: i32 = caps[2].parse().map_err(|_| invalid())?;

    // 00月や13月は from_ymd_opt が None を返す
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// 外部向けの期間境界パーサー（`parse_month` と同じ）
pub fn parse_period_boundary(token: &str) -> Result<NaiveDate, PeriodError> {
    parse_month(token)
}

/// 省略可能な "MM-YYYY" を解析する
///
/// 未指定または空文字列は「終了日なし」として `None` を返す。
pub fn parse_optional_month(token: Option<&str>) -> Result<Option<NaiveDate>, PeriodError> {
    match token {
        None | Some("") => Ok(None),
        Some(value) => parse_month(value).map(Some),
    }
}

/// 日付を "MM-YYYY" 形式に整形する
pub fn format_month(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}

/// 開始月と終了月の前後関係を検証する
///
/// # 引数
/// * `start` - 開始月（必須）
/// * `end` - 終了月（任意）
///
/// # 戻り値
/// 成功時はOk(())、開始月がない場合は `MissingStart`、
/// 終了月が開始月より前の場合は `InvalidRange`
pub fn validate_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), PeriodError> {
    let start = start.ok_or(PeriodError::MissingStart)?;

    match end {
        Some(end) if end < start => Err(PeriodError::InvalidRange {
            start: format_month(start),
            end: format_month(end),
        }),
        _ => Ok(()),
    }
}

/// 集計用の期間を月単位に広げる
///
/// 開始月の1日 00:00:00 から終了月の末日 23:59:59 までを返す。
/// 開始と終了の前後関係は検証しない（逆転した期間は集計結果が0になる）。
pub fn expand_period(start_token: &str, end_token: &str) -> Result<QueryPeriod, PeriodError> {
    let start_month = parse_month(start_token)?;
    let end_month = parse_month(end_token)?;

    let invalid_end = || PeriodError::InvalidFormat(end_token.to_string());
    let last_day = end_month
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid_end)?;

    Ok(QueryPeriod {
        start: start_month.and_time(chrono::NaiveTime::MIN),
        end: last_day.and_hms_opt(23, 59, 59).ok_or_else(invalid_end)?,
    })
}

/// 暦月の差（`a - b`）を返す
///
/// 日単位ではなく `12 * (年の差) + (月の差)` で計算するため、
/// 月の途中の日付でも端数は生じない。
pub fn months_between<A: Datelike, B: Datelike>(a: &A, b: &B) -> i64 {
    12 * (i64::from(a.year()) - i64::from(b.year())) + (i64::from(a.month()) - i64::from(b.month()))
}
