use async_trait::async_trait;

use crate::{
    NewOrder, NewProduct, Order, OrderChanges, OrderId, Page, Product, ProductChanges, ProductId,
    Result, UserId,
};

/// Persistence contract for products.
///
/// All implementations must be thread-safe (Send + Sync) since a single store
/// is shared by every in-flight request.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Looks up a product by ID. Returns None if it doesn't exist.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products ordered by ID within the given page window.
    async fn find_all(&self, page: Page) -> Result<Vec<Product>>;

    /// Inserts a new product and returns it with its assigned ID.
    async fn create(&self, product: NewProduct) -> Result<Product>;

    /// Persists the current field values of an already-loaded product.
    ///
    /// Saving a product that no longer exists is a no-op.
    async fn save(&self, product: &Product) -> Result<()>;

    /// Applies a partial update and returns the updated row, or None if no
    /// product has that ID.
    async fn update_fields(&self, id: ProductId, changes: ProductChanges)
    -> Result<Option<Product>>;

    /// Deletes a product. Returns the number of rows removed.
    async fn delete(&self, id: ProductId) -> Result<u64>;
}

/// Persistence contract for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up an order by ID. Returns None if it doesn't exist.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns every order placed by a user, ordered by ID.
    async fn find_all_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Inserts a new order and returns it with its assigned ID.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    /// Applies a partial update. Returns the number of rows affected.
    async fn update_fields(&self, id: OrderId, changes: OrderChanges) -> Result<u64>;

    /// Deletes an order. Returns the number of rows removed.
    async fn delete(&self, id: OrderId) -> Result<u64>;
}
