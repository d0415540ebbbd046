use super::models::{NewSubscription, Subscription, SubscriptionFilter};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "SELECT id, service_name, monthly_cost, user_id, start_date, end_date, created_at, updated_at
     FROM subscriptions";

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `new` - 検証済みのサブスクリプション内容
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラー
pub fn create(conn: &Connection, new: &NewSubscription) -> AppResult<Subscription> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO subscriptions (id, service_name, monthly_cost, user_id, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            new.service_name,
            new.monthly_cost,
            new.user_id.to_string(),
            new.start_date,
            new.end_date,
            now,
            now
        ],
    )?;

    find_by_id(conn, id)
}

/// IDでサブスクリプションを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
///
/// # 戻り値
/// サブスクリプション、または存在しない場合は `AppError::NotFound`
pub fn find_by_id(conn: &Connection, id: Uuid) -> AppResult<Subscription> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id.to_string()],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => not_found(id),
        _ => AppError::from(e),
    })
}

/// サブスクリプション一覧を取得する（契約者とサービス名でフィルタリング可能）
///
/// # 引数
/// * `conn` - データベース接続
/// * `filter` - 絞り込み条件
///
/// # 戻り値
/// 作成日時の新しい順のサブスクリプション一覧、または失敗時はエラー
pub fn find_all(conn: &Connection, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
    let mut query = format!("{SELECT_COLUMNS} WHERE 1=1");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    // 契約者フィルター
    if let Some(user_id) = filter.user_id {
        query.push_str(" AND user_id = ?");
        params.push(Box::new(user_id.to_string()));
    }

    // サービス名フィルター
    if let Some(service_name) = filter.service_name.as_deref().filter(|s| !s.is_empty()) {
        query.push_str(" AND service_name = ?");
        params.push(Box::new(service_name.to_string()));
    }

    query.push_str(" ORDER BY created_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&query)?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let subscriptions = stmt.query_map(param_refs.as_slice(), map_row)?;

    subscriptions
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)
}

/// サブスクリプションを更新する（全項目置き換え）
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `new` - 置き換え後の内容
///
/// # 戻り値
/// 更新されたサブスクリプション、または存在しない場合は `AppError::NotFound`
pub fn update(conn: &Connection, id: Uuid, new: &NewSubscription) -> AppResult<Subscription> {
    let now = Utc::now();

    let rows_affected = conn.execute(
        "UPDATE subscriptions
         SET service_name = ?1, monthly_cost = ?2, user_id = ?3, start_date = ?4, end_date = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            new.service_name,
            new.monthly_cost,
            new.user_id.to_string(),
            new.start_date,
            new.end_date,
            now,
            id.to_string()
        ],
    )?;

    if rows_affected == 0 {
        return Err(not_found(id));
    }

    find_by_id(conn, id)
}

/// サブスクリプションを削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
///
/// # 戻り値
/// 成功時はOk(())、存在しない場合は `AppError::NotFound`
pub fn delete(conn: &Connection, id: Uuid) -> AppResult<()> {
    let rows_affected = conn.execute(
        "DELETE FROM subscriptions WHERE id = ?1",
        params![id.to_string()],
    )?;

    if rows_affected == 0 {
        return Err(not_found(id));
    }

    Ok(())
}

pub(super) fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("ID {id} のサブスクリプション"))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: uuid_column(row, 0)?,
        service_name: row.get(1)?,
        monthly_cost: row.get(2)?,
        user_id: uuid_column(row, 3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// TEXTで保存したUUIDを読み出す
fn uuid_column(row: &Row<'_>, index: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(index)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}
