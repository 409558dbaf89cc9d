//! Order queries for the `PostgreSQL` store.

use async_trait::async_trait;

use corner_shop_core::{OrderId, Page};

use super::RepositoryError;
use super::postgres::PgTx;
use super::store::OrderStore;
use crate::models::{NewOrder, NewOrderLine, Order, OrderLine};

#[async_trait]
impl OrderStore for PgTx {
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO shop.guest_order
                (guest_name, guest_email, guest_phone, total_price, total_items)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, guest_name, guest_email, guest_phone, status,
                      total_price, total_items, created_at
            ",
        )
        .bind(&order.guest.guest_name)
        .bind(&order.guest.guest_email)
        .bind(&order.guest.guest_phone)
        .bind(order.total_price)
        .bind(order.total_items)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(order)
    }

    async fn create_lines(
        &mut self,
        order: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let mut created = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, OrderLine>(
                r"
                INSERT INTO shop.guest_order_line (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                RETURNING id, order_id, product_id, quantity
                ",
            )
            .bind(order)
            .bind(line.product_id)
            .bind(line.quantity)
            .fetch_one(&mut *self.tx)
            .await?;
            created.push(row);
        }
        Ok(created)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, guest_name, guest_email, guest_phone, status,
                   total_price, total_items, created_at
            FROM shop.guest_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(order)
    }

    async fn order_lines(&mut self, order: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT id, order_id, product_id, quantity
            FROM shop.guest_order_line
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(lines)
    }

    async fn list_orders(&mut self, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, guest_name, guest_email, guest_phone, status,
                   total_price, total_items, created_at
            FROM shop.guest_order
            ORDER BY created_at DESC, id DESC
            OFFSET $1
            LIMIT $2
            ",
        )
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(orders)
    }
}
