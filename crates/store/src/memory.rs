use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    NewOrder, NewProduct, Order, OrderChanges, OrderId, Page, Product, ProductChanges, ProductId,
    Result, StoreError, UserId,
    store::{OrderStore, ProductStore},
};

/// Bookkeeping shared by both in-memory tables.
#[derive(Debug)]
struct Table<K, V> {
    rows: BTreeMap<K, V>,
    next_id: i64,
    reads: usize,
    writes: usize,
    fail_writes: bool,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
            reads: 0,
            writes: 0,
            fail_writes: false,
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Records a write attempt, failing it if faults are switched on.
    fn begin_write(&mut self, operation: &str) -> Result<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable(format!(
                "{operation} rejected by in-memory store"
            )));
        }
        self.writes += 1;
        Ok(())
    }
}

/// In-memory product store for tests and database-less runs.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// counters and fault injection so tests can assert which calls were made.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    table: Arc<RwLock<Table<ProductId, Product>>>,
}

impl InMemoryProductStore {
    /// Creates a new empty product store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns true if no products are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }

    /// Returns how many lookups (`find_by_id`, `find_all`) were served.
    pub async fn read_count(&self) -> usize {
        self.table.read().await.reads
    }

    /// Returns how many writes succeeded.
    pub async fn write_count(&self) -> usize {
        self.table.read().await.writes
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`].
    pub async fn set_fail_writes(&self, fail: bool) {
        self.table.write().await.fail_writes = fail;
    }

    /// Removes a product without touching the counters. Used to simulate
    /// products deleted behind the engine's back.
    pub async fn remove(&self, id: ProductId) -> Option<Product> {
        self.table.write().await.rows.remove(&id)
    }

    /// Clears all products and counters.
    pub async fn clear(&self) {
        *self.table.write().await = Table::default();
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let mut table = self.table.write().await;
        table.reads += 1;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_all(&self, page: Page) -> Result<Vec<Product>> {
        let mut table = self.table.write().await;
        table.reads += 1;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(table
            .rows
            .values()
            .skip(offset)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        let mut table = self.table.write().await;
        table.begin_write("create product")?;

        let now = Utc::now();
        let id = ProductId::new(table.allocate_id());
        let product = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn save(&self, product: &Product) -> Result<()> {
        let mut table = self.table.write().await;
        table.begin_write("save product")?;

        if let Some(row) = table.rows.get_mut(&product.id) {
            *row = Product {
                updated_at: Utc::now(),
                created_at: row.created_at,
                ..product.clone()
            };
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>> {
        let mut table = self.table.write().await;
        table.begin_write("update product")?;

        Ok(table.rows.get_mut(&id).map(|row| {
            changes.apply(row);
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<u64> {
        let mut table = self.table.write().await;
        table.begin_write("delete product")?;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }
}

/// In-memory order store for tests and database-less runs.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<Table<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns true if no orders are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }

    /// Returns how many lookups were served.
    pub async fn read_count(&self) -> usize {
        self.table.read().await.reads
    }

    /// Returns how many writes succeeded.
    pub async fn write_count(&self) -> usize {
        self.table.read().await.writes
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`].
    pub async fn set_fail_writes(&self, fail: bool) {
        self.table.write().await.fail_writes = fail;
    }

    /// Removes an order without touching the counters. Used to simulate a
    /// concurrent deletion.
    pub async fn remove(&self, id: OrderId) -> Option<Order> {
        self.table.write().await.rows.remove(&id)
    }

    /// Clears all orders and counters.
    pub async fn clear(&self) {
        *self.table.write().await = Table::default();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let mut table = self.table.write().await;
        table.reads += 1;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_all_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>> {
        let mut table = self.table.write().await;
        table.reads += 1;
        Ok(table
            .rows
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut table = self.table.write().await;
        table.begin_write("create order")?;

        let now = Utc::now();
        let id = OrderId::new(table.allocate_id());
        let order = Order {
            id,
            user_id: order.user_id,
            product_id: order.product_id,
            quantity: order.quantity,
            total_amount: order.total_amount,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, order.clone());
        Ok(order)
    }

    async fn update_fields(&self, id: OrderId, changes: OrderChanges) -> Result<u64> {
        let mut table = self.table.write().await;
        table.begin_write("update order")?;

        match table.rows.get_mut(&id) {
            Some(row) => {
                changes.apply(row);
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<u64> {
        let mut table = self.table.write().await;
        table.begin_write("delete order")?;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }
}
