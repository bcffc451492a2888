//! Order service: creation, revision and deletion of orders, each paired with
//! the matching stock adjustment on the product.
//!
//! Order and product writes are separate store calls with no surrounding
//! transaction. A failure between them leaves the first write in place.

use common::{Money, OrderId, ProductId, UserId};
use store::{NewOrder, Order, OrderChanges, OrderStatus, OrderStore, ProductStore};

use crate::error::DomainError;

fn ensure_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be at least 1"));
    }
    Ok(())
}

fn order_total(price: Money, quantity: u32) -> Result<Money, DomainError> {
    price.multiply(quantity).ok_or_else(|| {
        tracing::warn!(%price, quantity, "order total out of range");
        DomainError::validation("Order total exceeds the supported amount")
    })
}

/// Applies a signed stock change, refusing results that do not fit an `i64`.
fn adjust_stock(stock: i64, change: i64) -> Result<i64, DomainError> {
    stock.checked_add(change).ok_or_else(|| {
        tracing::warn!(stock, change, "stock adjustment out of range");
        DomainError::validation("Stock exceeds the supported quantity")
    })
}

/// Service for managing orders.
///
/// Stateless apart from its store handles, so one instance can serve every
/// request concurrently.
pub struct OrderService<P: ProductStore, O: OrderStore> {
    products: P,
    orders: O,
}

impl<P: ProductStore, O: OrderStore> OrderService<P, O> {
    /// Creates a new order service over the given stores.
    pub fn new(products: P, orders: O) -> Self {
        Self { products, orders }
    }

    /// Returns a reference to the product store.
    pub fn products(&self) -> &P {
        &self.products
    }

    /// Returns a reference to the order store.
    pub fn orders(&self) -> &O {
        &self.orders
    }

    /// Places an order for `quantity` units of a product and takes the units
    /// out of stock.
    ///
    /// The order row is written before the stock decrement.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Order, DomainError> {
        ensure_quantity(quantity)?;

        let Some(mut product) = self.products.find_by_id(product_id).await? else {
            tracing::warn!(%product_id, "product not found during order creation");
            return Err(DomainError::product_not_found(product_id));
        };

        if product.stock < i64::from(quantity) {
            tracing::warn!(
                %product_id,
                requested_quantity = quantity,
                available_stock = product.stock,
                "not enough stock for product during order creation"
            );
            metrics::counter!("order_stock_rejections_total").increment(1);
            return Err(DomainError::validation("Not enough stock for this product"));
        }

        let total_amount = order_total(product.price, quantity)?;
        let remaining_stock = adjust_stock(product.stock, -i64::from(quantity))?;
        let order = self
            .orders
            .create(NewOrder {
                user_id,
                product_id,
                quantity,
                total_amount,
                status: OrderStatus::Pending,
            })
            .await?;

        product.stock = remaining_stock;
        self.products.save(&product).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            %product_id,
            quantity,
            %total_amount,
            remaining_stock = product.stock,
            "order created"
        );
        Ok(order)
    }

    /// Returns every order placed by a user, whatever its status.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.find_all_by_user_id(user_id).await?;
        tracing::info!(%user_id, order_count = orders.len(), "fetched orders by user id");
        Ok(orders)
    }

    /// Loads a single order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_id(&self, order_id: OrderId) -> Result<Order, DomainError> {
        match self.orders.find_by_id(order_id).await? {
            Some(order) => {
                tracing::info!(%order_id, "fetched order by id");
                Ok(order)
            }
            None => {
                tracing::warn!(%order_id, "order not found by id");
                Err(DomainError::order_not_found(order_id))
            }
        }
    }

    /// Overwrites the status of an order and returns the stored row. Any
    /// status is accepted; there is no transition graph.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        self.find_order(order_id, "order not found for status update").await?;

        let affected = self
            .orders
            .update_fields(order_id, OrderChanges::status(status))
            .await?;
        if affected == 0 {
            tracing::warn!(%order_id, "order disappeared before its status was written");
            return Err(DomainError::order_not_found(order_id));
        }

        let order = self.reload(order_id).await?;
        tracing::info!(%order_id, new_status = %order.status, "order status updated");
        Ok(order)
    }

    /// Changes the quantity of an order and moves the difference in or out of
    /// the product's stock.
    ///
    /// Delivered orders are frozen. Requesting the current quantity is a
    /// no-op that touches neither store.
    #[tracing::instrument(skip(self))]
    pub async fn update_order(
        &self,
        order_id: OrderId,
        quantity: u32,
    ) -> Result<Order, DomainError> {
        ensure_quantity(quantity)?;

        let order = self.find_order(order_id, "order not found for update").await?;

        if order.status.is_delivered() {
            tracing::warn!(%order_id, "attempt to change a delivered order");
            return Err(DomainError::validation("order already delivered"));
        }

        if quantity == order.quantity {
            tracing::info!(%order_id, "no quantity change detected for order update");
            return Ok(order);
        }

        let Some(mut product) = self.products.find_by_id(order.product_id).await? else {
            tracing::error!(
                %order_id,
                product_id = %order.product_id,
                "associated product not found for order update"
            );
            return Err(DomainError::Internal(
                "Associated product not found for order".to_string(),
            ));
        };

        // Negative when the order shrinks, which returns units to stock.
        let delta = i64::from(quantity) - i64::from(order.quantity);
        if product.stock < delta {
            tracing::warn!(
                %order_id,
                product_id = %product.id,
                requested_quantity = quantity,
                current_quantity = order.quantity,
                available_stock = product.stock,
                "not enough stock for quantity update"
            );
            metrics::counter!("order_stock_rejections_total").increment(1);
            return Err(DomainError::validation(
                "Not enough stock for this quantity update",
            ));
        }

        let total_amount = order_total(product.price, quantity)?;
        product.stock = adjust_stock(product.stock, -delta)?;
        self.products.save(&product).await?;

        self.orders
            .update_fields(order_id, OrderChanges::quantity(quantity, total_amount))
            .await?;

        metrics::counter!("orders_updated_total").increment(1);
        tracing::info!(
            %order_id,
            old_quantity = order.quantity,
            new_quantity = quantity,
            old_total_amount = %order.total_amount,
            new_total_amount = %total_amount,
            "order quantity and total amount updated"
        );

        self.reload(order_id).await
    }

    /// Deletes an order and returns its units to stock.
    ///
    /// A product that no longer exists is skipped. Returns false when the
    /// delete itself removed nothing, which means the order went away between
    /// the lookup and the delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<bool, DomainError> {
        let order = self.find_order(order_id, "order not found for deletion").await?;

        match self.products.find_by_id(order.product_id).await? {
            Some(mut product) => {
                product.stock = adjust_stock(product.stock, i64::from(order.quantity))?;
                self.products.save(&product).await?;
                tracing::debug!(
                    %order_id,
                    product_id = %product.id,
                    restored = order.quantity,
                    "stock restored for deleted order"
                );
            }
            None => {
                tracing::debug!(
                    %order_id,
                    product_id = %order.product_id,
                    "product already gone, skipping stock restoration"
                );
            }
        }

        let deleted = self.orders.delete(order_id).await? > 0;
        if deleted {
            metrics::counter!("orders_deleted_total").increment(1);
            tracing::info!(%order_id, "order deleted successfully");
        } else {
            tracing::warn!(
                %order_id,
                "order not deleted, possibly not found after initial check"
            );
        }
        Ok(deleted)
    }

    /// Re-reads an order after a write; a row deleted in between counts as
    /// not found.
    async fn reload(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.orders.find_by_id(order_id).await?.ok_or_else(|| {
            tracing::warn!(%order_id, "order disappeared after it was written");
            DomainError::order_not_found(order_id)
        })
    }

    async fn find_order(&self, order_id: OrderId, missing: &str) -> Result<Order, DomainError> {
        match self.orders.find_by_id(order_id).await? {
            Some(order) => Ok(order),
            None => {
                tracing::warn!(%order_id, "{missing}");
                Err(DomainError::order_not_found(order_id))
            }
        }
    }
}
