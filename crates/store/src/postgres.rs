use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Money, NewOrder, NewProduct, Order, OrderChanges, OrderId, OrderStatus, Page, Product,
    ProductChanges, ProductId, Result, StoreError, UserId,
    store::{OrderStore, ProductStore},
};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock, created_at, updated_at";

const ORDER_COLUMNS: &str =
    "id, user_id, product_id, quantity, total_amount_cents, status, created_at, updated_at";

/// Runs the embedded database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

fn quantity_to_column(quantity: u32) -> Result<i32> {
    i32::try_from(quantity)
        .map_err(|_| StoreError::OutOfRange(format!("quantity {quantity} exceeds INTEGER")))
}

/// PostgreSQL-backed product store.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get("stock")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn find_all(&self, page: Page) -> Result<Vec<Product>> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| StoreError::OutOfRange(format!("offset {}", page.offset())))?;

        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (name, description, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await?;

        let product = Self::row_to_product(row)?;
        tracing::debug!(product_id = %product.id, "product inserted");
        Ok(product)
    }

    async fn save(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price_cents = $4, stock = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_i64())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_fields(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                stock = COALESCE($5, stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price.map(|price| price.cents()))
        .bind(changes.stock)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let quantity: i32 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| StoreError::OutOfRange(format!("stored quantity {quantity}")))?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            status: OrderStatus::from(row.try_get::<String, _>("status")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_all_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY id ASC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn create(&self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (user_id, product_id, quantity, total_amount_cents, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.user_id.as_i64())
        .bind(order.product_id.as_i64())
        .bind(quantity_to_column(order.quantity)?)
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        let order = Self::row_to_order(row)?;
        tracing::debug!(order_id = %order.id, "order inserted");
        Ok(order)
    }

    async fn update_fields(&self, id: OrderId, changes: OrderChanges) -> Result<u64> {
        let quantity = changes.quantity.map(quantity_to_column).transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET quantity = COALESCE($2, quantity),
                total_amount_cents = COALESCE($3, total_amount_cents),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(quantity)
        .bind(changes.total_amount.map(|amount| amount.cents()))
        .bind(changes.status.map(String::from))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: OrderId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
