//! # Order Repository
//!
//! The SQLite order ledger.
//!
//! ## Append Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. UPDATE order_sequence SET last_value = last_value + 1              │
//! │     RETURNING last_value                      → 42                     │
//! │                                                                         │
//! │  2. INSERT INTO orders (..., order_number = '000042', sequence = 42)   │
//! │                                                                         │
//! │  COMMIT ← both succeed or both roll back                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UPDATE takes the SQLite write lock first, so concurrent appends queue
//! on it and each sees the previous one's number.

use chrono::{DateTime, Utc};
use kasa_core::ledger::OrderDraft;
use kasa_core::{Direction, Money, Order, OrderLedger};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_stored;
use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str = "id, order_number, direction, currency, rate, amount, discount_pct, \
                             vip, note, submitted_by, total_paid_hellers, created_at";

/// One `orders` row as stored.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    direction: Direction,
    currency: String,
    rate: String,
    amount: i64,
    discount_pct: String,
    vip: bool,
    note: String,
    submitted_by: String,
    total_paid_hellers: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            rate: parse_stored("orders.rate", &row.rate)?,
            discount_pct: parse_stored("orders.discount_pct", &row.discount_pct)?,
            id: row.id,
            order_number: row.order_number,
            direction: row.direction,
            currency: row.currency,
            amount: row.amount,
            vip: row.vip,
            note: row.note,
            submitted_by: row.submitted_by,
            total_paid: Money::from_hellers(row.total_paid_hellers),
            created_at: row.created_at,
        })
    }
}

/// Repository for the order ledger.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Numbers and stores an accepted order in one transaction.
    pub async fn insert(&self, draft: OrderDraft) -> DbResult<Order> {
        debug!(
            direction = %draft.direction,
            currency = %draft.currency,
            amount = draft.amount,
            "Appending order"
        );

        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar(
            "UPDATE order_sequence SET last_value = last_value + 1 WHERE id = 1 RETURNING last_value",
        )
        .fetch_one(&mut *tx)
        .await?;

        let sequence = u64::try_from(sequence)
            .map_err(|_| DbError::invalid("order_sequence.last_value", sequence.to_string()))?;

        let order = draft.into_order(Uuid::new_v4().to_string(), sequence, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, sequence, direction, currency, rate, amount,
                discount_pct, vip, note, submitted_by, total_paid_hellers, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(sequence as i64)
        .bind(order.direction)
        .bind(&order.currency)
        .bind(order.rate.to_string())
        .bind(order.amount)
        .bind(order.discount_pct.to_string())
        .bind(order.vip)
        .bind(&order.note)
        .bind(&order.submitted_by)
        .bind(order.total_paid.hellers())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total_paid = %order.total_paid,
            "Order recorded"
        );

        Ok(order)
    }

    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY sequence DESC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed recent orders");

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Last sequence value handed out; 0 for an empty ledger.
    pub async fn last_number(&self) -> DbResult<u64> {
        let value: i64 = sqlx::query_scalar("SELECT last_value FROM order_sequence WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(value)
            .map_err(|_| DbError::invalid("order_sequence.last_value", value.to_string()))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl OrderLedger for OrderRepository {
    type Error = DbError;

    async fn append(&self, draft: OrderDraft) -> Result<Order, Self::Error> {
        self.insert(draft).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn draft(amount: i64) -> OrderDraft {
        OrderDraft {
            direction: Direction::Sell,
            currency: "EUR".to_string(),
            rate: dec!(24.20),
            amount,
            discount_pct: dec!(0.5),
            vip: false,
            note: "test".to_string(),
            submitted_by: "jana".to_string(),
            total_paid: Money::from_hellers(amount * 2_408),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        assert_eq!(orders.last_number().await.unwrap(), 0);

        let first = orders.append(draft(100)).await.unwrap();
        let second = orders.append(draft(50)).await.unwrap();

        assert_eq!(first.order_number, "000001");
        assert_eq!(second.order_number, "000002");
        assert_eq!(orders.last_number().await.unwrap(), 2);
        assert_eq!(orders.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_values() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stored = db.orders().append(draft(100)).await.unwrap();

        let loaded = db
            .orders()
            .get_by_number("000001")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.id, stored.id);
        assert_eq!(loaded.direction, Direction::Sell);
        assert_eq!(loaded.rate, dec!(24.20));
        assert_eq!(loaded.discount_pct, dec!(0.5));
        assert_eq!(loaded.total_paid, Money::from_hellers(240_800));
        assert_eq!(loaded.created_at.timestamp(), stored.created_at.timestamp());

        assert!(db.orders().get_by_number("999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for amount in [10, 20, 30] {
            db.orders().append(draft(amount)).await.unwrap();
        }

        let recent = db.orders().list_recent(2).await.unwrap();
        let numbers: Vec<_> = recent.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["000003", "000002"]);
    }

    #[tokio::test]
    async fn test_failed_insert_does_not_consume_a_number() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.orders().append(draft(10)).await.unwrap();

        // amount > 0 is a CHECK constraint; the whole transaction rolls back.
        let err = db.orders().append(draft(0)).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert_eq!(db.orders().last_number().await.unwrap(), 1);

        let next = db.orders().append(draft(5)).await.unwrap();
        assert_eq!(next.order_number, "000002");
    }

    #[tokio::test]
    async fn test_concurrent_appends_get_distinct_numbers() {
        let path = std::env::temp_dir().join(format!("kasa-ledger-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let orders = db.orders();
                tokio::spawn(async move { orders.append(draft(i + 1)).await })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.insert(handle.await.unwrap().unwrap().order_number);
        }

        assert_eq!(numbers.len(), 16);
        assert_eq!(db.orders().last_number().await.unwrap(), 16);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
