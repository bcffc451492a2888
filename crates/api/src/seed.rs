//! Demo catalogue for development runs.

use common::Money;
use domain::{DomainError, ProductService};
use store::{NewProduct, Page, ProductStore};

/// Demo products: name, description, price in dollars, stock.
const DEMO_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Laptop", "Powerful laptop for work and gaming", 1200, 50),
    ("Mouse", "Ergonomic wireless mouse", 25, 200),
    ("Keyboard", "Mechanical keyboard with RGB lighting", 75, 100),
];

/// Seeds the demo products into an empty catalogue.
///
/// Returns how many products were created; a catalogue that already has
/// products is left alone.
pub async fn seed_demo_products<P: ProductStore>(
    products: &ProductService<P>,
) -> Result<usize, DomainError> {
    if !products.list_products(Page::new(1, 1)).await?.is_empty() {
        tracing::info!("catalogue already populated, skipping demo seed");
        return Ok(0);
    }

    for &(name, description, dollars, stock) in DEMO_PRODUCTS {
        products
            .create_product(NewProduct::new(
                name,
                description,
                Money::from_dollars(dollars),
                stock,
            ))
            .await?;
    }

    tracing::info!(count = DEMO_PRODUCTS.len(), "demo products seeded");
    Ok(DEMO_PRODUCTS.len())
}
