//! Integration tests for the order lifecycle engine.
//!
//! These tests drive [`OrderService`] end to end against the in-memory stores
//! and check the stock bookkeeping that accompanies every order change.

use async_trait::async_trait;
use common::{Money, OrderId, ProductId, UserId};
use domain::{DomainError, Entity, OrderService};
use store::{
    InMemoryOrderStore, InMemoryProductStore, NewOrder, NewProduct, Order, OrderChanges,
    OrderStatus, OrderStore, ProductChanges, ProductStore, StoreError,
};

type Service = OrderService<InMemoryProductStore, InMemoryOrderStore>;

/// Helper to create a service with one product in stock
async fn create_service(price: Money, stock: i64) -> (Service, ProductId) {
    let products = InMemoryProductStore::new();
    let product = products
        .create(NewProduct::new(
            "Widget",
            "A widget used by the lifecycle tests",
            price,
            stock,
        ))
        .await
        .unwrap();
    (
        OrderService::new(products, InMemoryOrderStore::new()),
        product.id,
    )
}

async fn stock(service: &Service, product_id: ProductId) -> i64 {
    service
        .products()
        .find_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .stock
}

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn create_update_delete_keeps_stock_consistent() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let user_id = UserId::new(1);

        // Create
        let order = service.create_order(user_id, product_id, 10).await.unwrap();
        assert_eq!(order.total_amount, Money::from_dollars(100));
        assert_eq!(stock(&service, product_id).await, 90);

        // Grow the order
        let order = service.update_order(order.id, 15).await.unwrap();
        assert_eq!(order.quantity, 15);
        assert_eq!(order.total_amount, Money::from_dollars(150));
        assert_eq!(stock(&service, product_id).await, 85);

        // Delete gives back the current quantity
        assert!(service.delete_order(order.id).await.unwrap());
        assert_eq!(stock(&service, product_id).await, 100);
        assert!(
            service
                .get_orders_by_user_id(user_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn shrinking_then_growing_an_order() {
        let (service, product_id) = create_service(Money::from_cents(1999), 20).await;

        let order = service
            .create_order(UserId::new(4), product_id, 10)
            .await
            .unwrap();
        assert_eq!(stock(&service, product_id).await, 10);

        let order = service.update_order(order.id, 5).await.unwrap();
        assert_eq!(stock(&service, product_id).await, 15);
        assert_eq!(order.total_amount, Money::from_cents(1999 * 5));

        let order = service.update_order(order.id, 20).await.unwrap();
        assert_eq!(stock(&service, product_id).await, 0);
        assert_eq!(order.total_amount, Money::from_cents(1999 * 20));
    }

    #[tokio::test]
    async fn total_follows_the_current_price() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 2)
            .await
            .unwrap();

        let mut product = service
            .products()
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        product.price = Money::from_dollars(12);
        service.products().save(&product).await.unwrap();

        let order = service.update_order(order.id, 3).await.unwrap();
        assert_eq!(order.total_amount, Money::from_dollars(36));
    }

    #[tokio::test]
    async fn orders_are_listed_per_user_whatever_their_status() {
        let (service, product_id) = create_service(Money::from_dollars(1), 100).await;
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        let first = service.create_order(alice, product_id, 1).await.unwrap();
        service.create_order(bob, product_id, 1).await.unwrap();
        let third = service.create_order(alice, product_id, 3).await.unwrap();
        service
            .update_order_status(first.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let orders = service.get_orders_by_user_id(alice).await.unwrap();
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert_eq!(orders[0].status, OrderStatus::Cancelled);

        assert!(
            service
                .get_orders_by_user_id(UserId::new(99))
                .await
                .unwrap()
                .is_empty()
        );
    }
}

mod stock_checks {
    use super::*;

    #[tokio::test]
    async fn insufficient_stock_creates_nothing() {
        let (service, product_id) = create_service(Money::from_dollars(10), 5).await;

        let err = service
            .create_order(UserId::new(1), product_id, 6)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Not enough stock for this product");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(service.orders().is_empty().await);
        assert_eq!(stock(&service, product_id).await, 5);
        assert_eq!(service.products().write_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_product_creates_nothing() {
        let (service, _) = create_service(Money::from_dollars(10), 5).await;

        let err = service
            .create_order(UserId::new(1), ProductId::new(999), 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: Entity::Product,
                id: 999
            }
        ));
        assert_eq!(service.orders().write_count().await, 0);
    }

    #[tokio::test]
    async fn growing_past_stock_is_rejected_and_changes_nothing() {
        let (service, product_id) = create_service(Money::from_dollars(10), 15).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        let order_writes = service.orders().write_count().await;

        let err = service.update_order(order.id, 16).await.unwrap_err();

        assert_eq!(err.to_string(), "Not enough stock for this quantity update");
        assert_eq!(stock(&service, product_id).await, 5);
        assert_eq!(service.orders().write_count().await, order_writes);
    }
}

mod frozen_orders {
    use super::*;

    #[tokio::test]
    async fn same_quantity_writes_nothing() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        let product_writes = service.products().write_count().await;
        let order_writes = service.orders().write_count().await;

        let unchanged = service.update_order(order.id, 10).await.unwrap();

        assert_eq!(unchanged, order);
        assert_eq!(service.products().write_count().await, product_writes);
        assert_eq!(service.orders().write_count().await, order_writes);
    }

    #[tokio::test]
    async fn delivered_order_cannot_change_quantity() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service
            .update_order_status(order.id, OrderStatus::from("delivered"))
            .await
            .unwrap();
        let reads = service.products().read_count().await;

        // Same quantity too: the delivered check comes first.
        for quantity in [10, 11, 1] {
            let err = service.update_order(order.id, quantity).await.unwrap_err();
            assert_eq!(err.to_string(), "order already delivered");
        }

        assert_eq!(service.products().read_count().await, reads);
        let stored = service.get_order_by_id(order.id).await.unwrap();
        assert_eq!(stored.quantity, 10);
        assert_eq!(stored.total_amount, Money::from_dollars(100));
    }

    #[tokio::test]
    async fn status_comparison_is_case_sensitive() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service
            .update_order_status(order.id, OrderStatus::from("Delivered"))
            .await
            .unwrap();

        let updated = service.update_order(order.id, 12).await.unwrap();
        assert_eq!(updated.quantity, 12);
    }
}

mod dangling_products {
    use super::*;

    #[tokio::test]
    async fn update_with_missing_product_is_internal() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service.products().remove(product_id).await;

        let err = service.update_order(order.id, 11).await.unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.to_string(), "Associated product not found for order");
        let stored = service.get_order_by_id(order.id).await.unwrap();
        assert_eq!(stored.quantity, 10);
    }

    #[tokio::test]
    async fn delete_with_missing_product_still_deletes() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service.products().remove(product_id).await;
        let product_writes = service.products().write_count().await;

        assert!(service.delete_order(order.id).await.unwrap());

        assert_eq!(service.products().write_count().await, product_writes);
        assert!(service.orders().find_by_id(order.id).await.unwrap().is_none());
    }
}

mod store_faults {
    use super::*;

    #[tokio::test]
    async fn failed_stock_write_leaves_order_in_place() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        service.products().set_fail_writes(true).await;

        let err = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Store(StoreError::Unavailable(_))));
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(service.orders().len().await, 1);
        assert_eq!(stock(&service, product_id).await, 100);
    }

    #[tokio::test]
    async fn failed_order_write_after_stock_move() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service.orders().set_fail_writes(true).await;

        let result = service.update_order(order.id, 12).await;

        assert!(matches!(result, Err(DomainError::Store(_))));
        // The stock moved before the order write was attempted.
        assert_eq!(stock(&service, product_id).await, 88);
        let stored = service.get_order_by_id(order.id).await.unwrap();
        assert_eq!(stored.quantity, 10);
    }

    #[tokio::test]
    async fn concurrently_removed_order_reports_not_found_on_delete() {
        let (service, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        service.orders().remove(order.id).await;

        let err = service.delete_order(order.id).await.unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
        assert_eq!(stock(&service, product_id).await, 90);
    }
}

mod overflow {
    use super::*;

    #[tokio::test]
    async fn order_total_beyond_i64_is_rejected_before_writes() {
        let (service, product_id) = create_service(Money::from_cents(i64::MAX / 2 + 1), 10).await;

        let err = service
            .create_order(UserId::new(1), product_id, 2)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(service.orders().write_count().await, 0);
        assert_eq!(stock(&service, product_id).await, 10);
    }

    #[tokio::test]
    async fn restoring_stock_past_i64_is_rejected_and_keeps_the_order() {
        let (service, product_id) = create_service(Money::from_dollars(1), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 5)
            .await
            .unwrap();
        service
            .products()
            .update_fields(
                product_id,
                ProductChanges {
                    stock: Some(i64::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.delete_order(order.id).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(stock(&service, product_id).await, i64::MAX);
        assert!(service.orders().find_by_id(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn shrinking_an_order_past_i64_stock_is_rejected() {
        let (service, product_id) = create_service(Money::from_dollars(1), 100).await;
        let order = service
            .create_order(UserId::new(1), product_id, 5)
            .await
            .unwrap();
        service
            .products()
            .update_fields(
                product_id,
                ProductChanges {
                    stock: Some(i64::MAX - 1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.update_order(order.id, 1).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(stock(&service, product_id).await, i64::MAX - 1);
        let stored = service.get_order_by_id(order.id).await.unwrap();
        assert_eq!(stored.quantity, 5);
    }
}

mod concurrent_removal {
    use super::*;

    /// When the order row disappears relative to a field update.
    #[derive(Clone, Copy)]
    enum Vanish {
        BeforeWrite,
        AfterWrite,
    }

    /// Order store that deletes the row around `update_fields`, as a
    /// concurrent request would.
    #[derive(Clone)]
    struct VanishingOrderStore {
        inner: InMemoryOrderStore,
        vanish: Vanish,
    }

    #[async_trait]
    impl OrderStore for VanishingOrderStore {
        async fn find_by_id(&self, id: OrderId) -> store::Result<Option<Order>> {
            self.inner.find_by_id(id).await
        }

        async fn find_all_by_user_id(&self, user_id: UserId) -> store::Result<Vec<Order>> {
            self.inner.find_all_by_user_id(user_id).await
        }

        async fn create(&self, order: NewOrder) -> store::Result<Order> {
            self.inner.create(order).await
        }

        async fn update_fields(&self, id: OrderId, changes: OrderChanges) -> store::Result<u64> {
            match self.vanish {
                Vanish::BeforeWrite => {
                    self.inner.remove(id).await;
                    self.inner.update_fields(id, changes).await
                }
                Vanish::AfterWrite => {
                    let affected = self.inner.update_fields(id, changes).await?;
                    self.inner.remove(id).await;
                    Ok(affected)
                }
            }
        }

        async fn delete(&self, id: OrderId) -> store::Result<u64> {
            self.inner.delete(id).await
        }
    }

    async fn service_with(
        vanish: Vanish,
    ) -> (
        OrderService<InMemoryProductStore, VanishingOrderStore>,
        ProductId,
        OrderId,
    ) {
        let (seeded, product_id) = create_service(Money::from_dollars(10), 100).await;
        let order = seeded
            .create_order(UserId::new(1), product_id, 10)
            .await
            .unwrap();
        let orders = VanishingOrderStore {
            inner: seeded.orders().clone(),
            vanish,
        };
        (
            OrderService::new(seeded.products().clone(), orders),
            product_id,
            order.id,
        )
    }

    #[tokio::test]
    async fn status_write_that_hits_no_row_is_not_found() {
        let (service, _, order_id) = service_with(Vanish::BeforeWrite).await;

        let err = service
            .update_order_status(order_id, OrderStatus::Completed)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: Entity::Order,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn status_update_whose_row_vanishes_after_the_write_is_not_found() {
        let (service, _, order_id) = service_with(Vanish::AfterWrite).await;

        let err = service
            .update_order_status(order_id, OrderStatus::Completed)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "ORDER_NOT_FOUND");
    }

    #[tokio::test]
    async fn quantity_update_whose_row_vanishes_after_the_write_is_not_found() {
        let (service, product_id, order_id) = service_with(Vanish::AfterWrite).await;

        let err = service.update_order(order_id, 12).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: Entity::Order,
                ..
            }
        ));
        // Stock moved before the order write, and stays moved.
        assert_eq!(
            service
                .products()
                .find_by_id(product_id)
                .await
                .unwrap()
                .unwrap()
                .stock,
            88
        );
    }
}
