//! サブスクリプションの永続化境界
//!
//! サービス層は `SubscriptionStore` トレイト越しにのみ保存先へアクセスする。
//! 本番ではSQLite、テストではメモリ上の実装を使う。

use super::models::{NewSubscription, Subscription, SubscriptionFilter};
use super::repository::{self, not_found};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// サブスクリプションの保存先
pub trait SubscriptionStore: Send + Sync {
    /// 新しいサブスクリプションを保存し、IDと作成日時を割り当てる
    fn create(&self, new: &NewSubscription) -> AppResult<Subscription>;

    /// IDで取得する（存在しない場合は `AppError::NotFound`）
    fn find_by_id(&self, id: Uuid) -> AppResult<Subscription>;

    /// 全項目を置き換える（存在しない場合は `AppError::NotFound`）
    fn update(&self, id: Uuid, new: &NewSubscription) -> AppResult<Subscription>;

    /// 削除する（存在しない場合は `AppError::NotFound`）
    fn delete(&self, id: Uuid) -> AppResult<()>;

    /// 条件に一致するものを作成日時の新しい順で返す
    fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>>;
}

/// SQLiteを使った保存先
pub struct SqliteSubscriptionStore {
    conn: Mutex<Connection>,
}

impl SqliteSubscriptionStore {
    /// 初期化済みの接続から作成する
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロックエラー: {e}")))
    }
}

impl SubscriptionStore for SqliteSubscriptionStore {
    fn create(&self, new: &NewSubscription) -> AppResult<Subscription> {
        let conn = self.lock()?;
        repository::create(&conn, new)
    }

    fn find_by_id(&self, id: Uuid) -> AppResult<Subscription> {
        let conn = self.lock()?;
        repository::find_by_id(&conn, id)
    }

    fn update(&self, id: Uuid, new: &NewSubscription) -> AppResult<Subscription> {
        let conn = self.lock()?;
        repository::update(&conn, id, new)
    }

    fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.lock()?;
        repository::delete(&conn, id)
    }

    fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let conn = self.lock()?;
        repository::find_all(&conn, filter)
    }
}

/// メモリ上の保存先（テストや組み込み用途向け）
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Vec<Subscription>>> {
        self.records
            .lock()
            .map_err(|e| AppError::concurrency(format!("ストアロックエラー: {e}")))
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    fn create(&self, new: &NewSubscription) -> AppResult<Subscription> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: new.service_name.clone(),
            monthly_cost: new.monthly_cost,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.push(subscription.clone());
        Ok(subscription)
    }

    fn find_by_id(&self, id: Uuid) -> AppResult<Subscription> {
        self.lock()?
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn update(&self, id: Uuid, new: &NewSubscription) -> AppResult<Subscription> {
        let mut records = self.lock()?;
        let existing = records
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;

        existing.service_name = new.service_name.clone();
        existing.monthly_cost = new.monthly_cost;
        existing.user_id = new.user_id;
        existing.start_date = new.start_date;
        existing.end_date = new.end_date;
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|s| s.id != id);

        if records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        // 挿入順に並んでいるので、逆順にすれば新しい順になる
        Ok(self
            .lock()?
            .iter()
            .rev()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}
