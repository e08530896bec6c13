//! # Order Repository
//!
//! Database operations for priced orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. INSERT                                                             │
//! │     └── insert() → Order { order_number: YYYYMMDD-NNNN }               │
//! │         ├── with link    → RequiresPayment, visible                    │
//! │         └── saved only   → Pending, hidden                             │
//! │                                                                         │
//! │  2. (OPTIONAL) LINK LATER                                              │
//! │     └── attach_checkout_link() → RequiresPayment                       │
//! │                                                                         │
//! │  3. SETTLE                                                             │
//! │     └── update_payment_status() → Paid / Failed / Canceled / Refunded  │
//! │                                                                         │
//! │  Cart, fees, breakdown, receipt are written once and never repriced.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use plateful_core::{
    Cart, Customer, FeeSchedule, FulfillmentType, Order, PaymentStatus, PriceBreakdown,
    ReceiptLine,
};

/// Upper bound on rows returned by the list queries.
pub const MAX_LIST_LIMIT: i64 = 500;

const SELECT_ORDER: &str = r#"
    SELECT
        id,
        order_number,
        restaurant_id,
        customer_json,
        fulfillment,
        notes,
        cart_json,
        fees_json,
        breakdown_json,
        receipt_json,
        payment_status,
        checkout_link_id,
        checkout_url,
        is_visible,
        created_at,
        updated_at
    FROM orders
"#;

// =============================================================================
// Input / Row Types
// =============================================================================

/// Everything needed to persist an order; id, number and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant_id: String,
    pub customer: Customer,
    pub fulfillment: FulfillmentType,
    pub notes: Option<String>,
    pub cart: Cart,
    pub fees: FeeSchedule,
    pub breakdown: PriceBreakdown,
    pub receipt_lines: Vec<ReceiptLine>,
    pub payment_status: PaymentStatus,
    pub checkout_link_id: Option<String>,
    pub checkout_url: Option<String>,
    pub is_visible: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    restaurant_id: String,
    customer_json: String,
    fulfillment: FulfillmentType,
    notes: Option<String>,
    cart_json: String,
    fees_json: String,
    breakdown_json: String,
    receipt_json: String,
    payment_status: PaymentStatus,
    checkout_link_id: Option<String>,
    checkout_url: Option<String>,
    is_visible: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            restaurant_id: row.restaurant_id,
            customer: serde_json::from_str(&row.customer_json)?,
            fulfillment: row.fulfillment,
            notes: row.notes,
            cart: serde_json::from_str(&row.cart_json)?,
            fees: serde_json::from_str(&row.fees_json)?,
            breakdown: serde_json::from_str(&row.breakdown_json)?,
            receipt_lines: serde_json::from_str(&row.receipt_json)?,
            payment_status: row.payment_status,
            checkout_link_id: row.checkout_link_id,
            checkout_url: row.checkout_url,
            is_visible: row.is_visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fixed-width UTC timestamp so `ORDER BY created_at` sorts chronologically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a new order and returns it with id, number and timestamps.
    ///
    /// The order number and the row are written in one transaction, so a
    /// failed insert never burns a number.
    pub async fn insert(&self, new: NewOrder) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let mut tx = self.pool.begin().await?;
        let order_number = next_order_number(&mut tx, created_at).await?;

        debug!(id = %id, order_number = %order_number, status = %new.payment_status, "Inserting order");

        let order = Order {
            id,
            order_number,
            restaurant_id: new.restaurant_id,
            customer: new.customer,
            fulfillment: new.fulfillment,
            notes: new.notes,
            cart: new.cart,
            fees: new.fees,
            breakdown: new.breakdown,
            receipt_lines: new.receipt_lines,
            payment_status: new.payment_status,
            checkout_link_id: new.checkout_link_id,
            checkout_url: new.checkout_url,
            is_visible: new.is_visible,
            created_at,
            updated_at: created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, restaurant_id,
                customer_name, customer_phone, customer_json, fulfillment, notes,
                cart_json, fees_json, breakdown_json, receipt_json,
                gross_total_cents, application_fee_cents,
                payment_status, checkout_link_id, checkout_url,
                is_visible, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14,
                ?15, ?16, ?17,
                ?18, ?19, ?20
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.restaurant_id)
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(serde_json::to_string(&order.customer)?)
        .bind(order.fulfillment)
        .bind(&order.notes)
        .bind(serde_json::to_string(&order.cart)?)
        .bind(serde_json::to_string(&order.fees)?)
        .bind(serde_json::to_string(&order.breakdown)?)
        .bind(serde_json::to_string(&order.receipt_lines)?)
        .bind(order.breakdown.gross_total_cents)
        .bind(order.breakdown.application_fee_cents)
        .bind(order.payment_status)
        .bind(&order.checkout_link_id)
        .bind(&order.checkout_url)
        .bind(order.is_visible)
        .bind(timestamp(order.created_at))
        .bind(timestamp(order.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets the order a checkout link was created for.
    pub async fn get_by_checkout_link(&self, link_id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("{} WHERE checkout_link_id = ?1", SELECT_ORDER))
                .bind(link_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    /// Lists orders newest first.
    ///
    /// Hidden orders (saved without a link) are skipped unless `include_hidden`.
    pub async fn list_recent(&self, limit: i64, include_hidden: bool) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{} WHERE (?1 OR is_visible = 1) ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            SELECT_ORDER
        ))
        .bind(include_hidden)
        .bind(limit.clamp(1, MAX_LIST_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lists orders in one payment status, newest first.
    pub async fn list_by_status(&self, status: PaymentStatus, limit: i64) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{} WHERE payment_status = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            SELECT_ORDER
        ))
        .bind(status)
        .bind(limit.clamp(1, MAX_LIST_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Attaches a checkout link to a saved order and moves it to RequiresPayment.
    ///
    /// Allowed from Pending (saved only) and Failed (new link after a failed
    /// payment). The order becomes visible.
    pub async fn attach_checkout_link(
        &self,
        id: &str,
        link_id: &str,
        url: &str,
    ) -> DbResult<Order> {
        let current = self.require(id).await?;
        let next = current
            .payment_status
            .transition_to(id, PaymentStatus::RequiresPayment)
            .map_err(|e| DbError::InvalidTransition(e.to_string()))?;

        debug!(id = %id, link_id = %link_id, "Attaching checkout link");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                checkout_link_id = ?2,
                checkout_url = ?3,
                payment_status = ?4,
                is_visible = 1,
                updated_at = ?5
            WHERE id = ?1 AND payment_status = ?6
            "#,
        )
        .bind(id)
        .bind(link_id)
        .bind(url)
        .bind(next)
        .bind(timestamp(now()))
        .bind(current.payment_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", id));
        }

        self.require(id).await
    }

    /// Moves an order to `next`, enforcing the payment lifecycle.
    ///
    /// The update is conditional on the status read, so two concurrent
    /// updates cannot both apply.
    pub async fn update_payment_status(&self, id: &str, next: PaymentStatus) -> DbResult<Order> {
        let current = self.require(id).await?;
        current
            .payment_status
            .transition_to(id, next)
            .map_err(|e| DbError::InvalidTransition(e.to_string()))?;

        debug!(id = %id, from = %current.payment_status, to = %next, "Updating payment status");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_status = ?2,
                updated_at = ?3
            WHERE id = ?1 AND payment_status = ?4
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(timestamp(now()))
        .bind(current.payment_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", id));
        }

        self.require(id).await
    }

    /// Shows or hides an order on the dashboard.
    pub async fn set_visibility(&self, id: &str, visible: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET is_visible = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(visible)
            .bind(timestamp(now()))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn require(&self, id: &str) -> DbResult<Order> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }
}

/// Hands out the next `YYYYMMDD-NNNN` for the UTC day of `at`.
async fn next_order_number(tx: &mut Transaction<'_, Sqlite>, at: DateTime<Utc>) -> DbResult<String> {
    let day = at.format("%Y%m%d").to_string();

    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_number_sequence (day, last_value) VALUES (?1, 1)
        ON CONFLICT(day) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(&day)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("{}-{:04}", day, seq))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use plateful_core::{price, CartItem};

    async fn repo() -> OrderRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().orders()
    }

    fn new_order(status: PaymentStatus, visible: bool) -> NewOrder {
        let cart = Cart::new(vec![
            CartItem::new("Burger", 1000, 2).with_modifier("Cheese", 150),
        ])
        .with_tip_cents(500);
        let fees = FeeSchedule::default();
        let quote = price(&cart, &fees).unwrap();

        NewOrder {
            restaurant_id: "rest-1".to_string(),
            customer: Customer {
                name: "Dana Reyes".to_string(),
                phone: "555-010-4477".to_string(),
                address: None,
            },
            fulfillment: FulfillmentType::Pickup,
            notes: Some("ring the bell".to_string()),
            cart,
            fees,
            breakdown: quote.breakdown,
            receipt_lines: quote.receipt_lines,
            payment_status: status,
            checkout_link_id: None,
            checkout_url: None,
            is_visible: visible,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        let inserted = repo
            .insert(new_order(PaymentStatus::Pending, false))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.breakdown.tip_skim_cents, 100);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential_per_day() {
        let repo = repo().await;
        let first = repo.insert(new_order(PaymentStatus::Pending, true)).await.unwrap();
        let second = repo.insert(new_order(PaymentStatus::Pending, true)).await.unwrap();

        let (day1, seq1) = first.order_number.split_once('-').unwrap();
        let (day2, seq2) = second.order_number.split_once('-').unwrap();
        assert_eq!(day1.len(), 8);
        assert_eq!(seq1.len(), 4);
        if day1 == day2 {
            assert_eq!(seq2.parse::<u32>().unwrap(), seq1.parse::<u32>().unwrap() + 1);
        }
    }

    #[tokio::test]
    async fn test_list_recent_respects_visibility() {
        let repo = repo().await;
        let visible = repo.insert(new_order(PaymentStatus::RequiresPayment, true)).await.unwrap();
        let hidden = repo.insert(new_order(PaymentStatus::Pending, false)).await.unwrap();

        let shown = repo.list_recent(10, false).await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, visible.id);

        let all = repo.list_recent(10, true).await.unwrap();
        assert_eq!(all.len(), 2);
        // newest first
        assert_eq!(all[0].id, hidden.id);

        repo.set_visibility(&hidden.id, true).await.unwrap();
        assert_eq!(repo.list_recent(10, false).await.unwrap().len(), 2);

        assert!(matches!(
            repo.set_visibility("missing", true).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_attach_checkout_link() {
        let repo = repo().await;
        let saved = repo.insert(new_order(PaymentStatus::Pending, false)).await.unwrap();

        let linked = repo
            .attach_checkout_link(&saved.id, "plink_123", "https://pay.example/plink_123")
            .await
            .unwrap();
        assert_eq!(linked.payment_status, PaymentStatus::RequiresPayment);
        assert_eq!(linked.checkout_link_id.as_deref(), Some("plink_123"));
        assert!(linked.is_visible);

        let by_link = repo.get_by_checkout_link("plink_123").await.unwrap().unwrap();
        assert_eq!(by_link.id, saved.id);

        // RequiresPayment → RequiresPayment is not a lifecycle step
        assert!(matches!(
            repo.attach_checkout_link(&saved.id, "plink_456", "https://pay.example/plink_456")
                .await,
            Err(DbError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_update_payment_status_enforces_lifecycle() {
        let repo = repo().await;
        let order = repo
            .insert(new_order(PaymentStatus::RequiresPayment, true))
            .await
            .unwrap();

        let paid = repo
            .update_payment_status(&order.id, PaymentStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        // the snapshot is untouched by status changes
        assert_eq!(paid.breakdown, order.breakdown);

        assert!(matches!(
            repo.update_payment_status(&order.id, PaymentStatus::Failed).await,
            Err(DbError::InvalidTransition(_))
        ));

        let refunded = repo
            .update_payment_status(&order.id, PaymentStatus::Refunded)
            .await
            .unwrap();
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);

        assert!(matches!(
            repo.update_payment_status("missing", PaymentStatus::Paid).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let repo = repo().await;
        repo.insert(new_order(PaymentStatus::RequiresPayment, true)).await.unwrap();
        repo.insert(new_order(PaymentStatus::RequiresPayment, true)).await.unwrap();
        repo.insert(new_order(PaymentStatus::Pending, false)).await.unwrap();

        let waiting = repo
            .list_by_status(PaymentStatus::RequiresPayment, 10)
            .await
            .unwrap();
        assert_eq!(waiting.len(), 2);
        assert!(waiting
            .iter()
            .all(|o| o.payment_status == PaymentStatus::RequiresPayment));

        assert!(repo
            .list_by_status(PaymentStatus::Paid, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T09:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(at), "2026-03-01T09:05:00.000000Z");
    }
}
