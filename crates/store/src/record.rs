//! Product and order records as persisted by the stores.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A catalogue product with its available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price.
    pub price: Money,
    /// Units available for ordering. Never negative after a committed write.
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
}

impl NewProduct {
    /// Creates the fields for a new product.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            stock,
        }
    }
}

/// Partial update of a product. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl ProductChanges {
    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }

    /// Applies the present fields to an in-memory product.
    pub fn apply(&self, product: &mut Product) {
        if let Some(ref name) = self.name {
            product.name = name.clone();
        }
        if let Some(ref description) = self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

/// Lifecycle status of an order.
///
/// The set is open-ended: any string is a valid status, the well-known ones
/// get their own variant. Only [`OrderStatus::Delivered`] changes engine
/// behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Delivered,
    Other(String),
}

impl OrderStatus {
    /// Returns the status as stored and serialized.
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Other(status) => status,
        }
    }

    /// Returns true once the order has been delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OrderStatus {
    fn from(status: &str) -> Self {
        match status {
            "pending" => OrderStatus::Pending,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            "delivered" => OrderStatus::Delivered,
            other => OrderStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(status: String) -> Self {
        OrderStatus::from(status.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

/// A purchase of a single product by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Product price times quantity as of the last write.
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_amount: Money,
    pub status: OrderStatus,
}

/// Partial update of an order. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub quantity: Option<u32>,
    pub total_amount: Option<Money>,
    pub status: Option<OrderStatus>,
}

impl OrderChanges {
    /// Changes only the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Changes the quantity together with its recomputed total.
    pub fn quantity(quantity: u32, total_amount: Money) -> Self {
        Self {
            quantity: Some(quantity),
            total_amount: Some(total_amount),
            ..Default::default()
        }
    }

    /// Applies the present fields to an in-memory order.
    pub fn apply(&self, order: &mut Order) {
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(total_amount) = self.total_amount {
            order.total_amount = total_amount;
        }
        if let Some(ref status) = self.status {
            order.status = status.clone();
        }
    }
}
