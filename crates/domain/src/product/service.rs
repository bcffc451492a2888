use common::ProductId;
use store::{NewProduct, Page, Product, ProductChanges, ProductStore};

use crate::error::DomainError;

fn ensure_non_negative(stock: Option<i64>, price_cents: Option<i64>) -> Result<(), DomainError> {
    if stock.is_some_and(|stock| stock < 0) {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    if price_cents.is_some_and(|cents| cents < 0) {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}

/// Service for managing the product catalogue.
pub struct ProductService<P: ProductStore> {
    products: P,
}

impl<P: ProductStore> ProductService<P> {
    /// Creates a new product service.
    pub fn new(products: P) -> Self {
        Self { products }
    }

    /// Returns a reference to the product store.
    pub fn products(&self) -> &P {
        &self.products
    }

    /// Lists products ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, page: Page) -> Result<Vec<Product>, DomainError> {
        let products = self.products.find_all(page).await?;
        tracing::debug!(count = products.len(), "listed products");
        Ok(products)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.products.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!(product_id = %id, "product not found");
            DomainError::product_not_found(id)
        })
    }

    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        ensure_non_negative(Some(product.stock), Some(product.price.cents()))?;

        let product = self.products.create(product).await?;
        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Applies a partial update to a product.
    ///
    /// Stock set here is an absolute value and bypasses the order engine.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, DomainError> {
        ensure_non_negative(changes.stock, changes.price.map(|price| price.cents()))?;

        match self.products.update_fields(id, changes).await? {
            Some(product) => {
                tracing::info!(product_id = %id, "product updated");
                Ok(product)
            }
            None => {
                tracing::warn!(product_id = %id, "product not found for update");
                Err(DomainError::product_not_found(id))
            }
        }
    }

    /// Deletes a product and returns the number of rows removed. Orders that
    /// reference it are left in place.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<u64, DomainError> {
        let deleted = self.products.delete(id).await?;
        if deleted == 0 {
            tracing::warn!(product_id = %id, "product not found for deletion");
            return Err(DomainError::product_not_found(id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use common::Money;
    use store::InMemoryProductStore;

    use super::*;

    fn keyboard() -> NewProduct {
        NewProduct::new(
            "Keyboard",
            "Mechanical keyboard with RGB",
            Money::from_dollars(75),
            100,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let service = ProductService::new(InMemoryProductStore::new());

        let created = service.create_product(keyboard()).await.unwrap();
        let fetched = service.get_product(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.price, Money::from_cents(7500));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_stock() {
        let service = ProductService::new(InMemoryProductStore::new());
        let mut product = keyboard();
        product.stock = -1;

        let result = service.create_product(product).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(service.products().is_empty().await);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let service = ProductService::new(InMemoryProductStore::new());

        let err = service.get_product(ProductId::new(999)).await.unwrap_err();
        assert_eq!(err.code(), "PRODUCT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_product_partial() {
        let service = ProductService::new(InMemoryProductStore::new());
        let created = service.create_product(keyboard()).await.unwrap();

        let updated = service
            .update_product(
                created.id,
                ProductChanges {
                    stock: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stock, 7);
        assert_eq!(updated.name, "Keyboard");
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let service = ProductService::new(InMemoryProductStore::new());

        let result = service
            .update_product(
                ProductId::new(3),
                ProductChanges {
                    name: Some("Trackball".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { id: 3, .. })));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_price() {
        let service = ProductService::new(InMemoryProductStore::new());
        let created = service.create_product(keyboard()).await.unwrap();

        let result = service
            .update_product(
                created.id,
                ProductChanges {
                    price: Some(Money::from_cents(-1)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(service.products().write_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_products_pages() {
        let service = ProductService::new(InMemoryProductStore::new());
        for _ in 0..3 {
            service.create_product(keyboard()).await.unwrap();
        }

        let first = service.list_products(Page::new(1, 2)).await.unwrap();
        let second = service.list_products(Page::new(2, 2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, ProductId::new(3));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let service = ProductService::new(InMemoryProductStore::new());
        let created = service.create_product(keyboard()).await.unwrap();

        assert_eq!(service.delete_product(created.id).await.unwrap(), 1);

        let again = service.delete_product(created.id).await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }
}
