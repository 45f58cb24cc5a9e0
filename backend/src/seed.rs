//! Sample catalogue for development databases

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::AppResult;

/// A product row to insert
#[derive(Debug, Clone)]
pub struct SampleProduct {
    pub name: &'static str,
    pub image: &'static str,
    pub description: &'static str,
    pub brand: &'static str,
    pub category: &'static str,
    pub price: Decimal,
    pub count_in_stock: i32,
    pub rating: Decimal,
    pub num_reviews: i32,
}

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300";

/// The three sample products
pub fn sample_products() -> Vec<SampleProduct> {
    vec![
        SampleProduct {
            name: "Sample Product 1",
            image: PLACEHOLDER_IMAGE,
            description: "This is a sample product 1 description.",
            brand: "Brand A",
            category: "Category A",
            price: Decimal::new(2999, 2),
            count_in_stock: 10,
            rating: Decimal::new(45, 1),
            num_reviews: 10,
        },
        SampleProduct {
            name: "Sample Product 2",
            image: PLACEHOLDER_IMAGE,
            description: "This is a sample product 2 description.",
            brand: "Brand B",
            category: "Category B",
            price: Decimal::new(3999, 2),
            count_in_stock: 5,
            rating: Decimal::new(40, 1),
            num_reviews: 8,
        },
        SampleProduct {
            name: "Sample Product 3",
            image: PLACEHOLDER_IMAGE,
            description: "This is a sample product 3 description.",
            brand: "Brand C",
            category: "Category C",
            price: Decimal::new(1999, 2),
            // out of stock on purpose
            count_in_stock: 0,
            rating: Decimal::new(35, 1),
            num_reviews: 4,
        },
    ]
}

/// Delete every product (reviews cascade)
pub async fn destroy_products(db: &PgPool) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM products").execute(db).await?;
    Ok(result.rows_affected())
}

/// Replace the catalogue with the sample products
pub async fn import_sample_products(db: &PgPool) -> AppResult<usize> {
    let products = sample_products();
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

    for p in &products {
        sqlx::query(
            r#"
            INSERT INTO products
                (name, image, description, brand, category, price, count_in_stock, rating, num_reviews)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(p.name)
        .bind(p.image)
        .bind(p.description)
        .bind(p.brand)
        .bind(p.category)
        .bind(p.price)
        .bind(p.count_in_stock)
        .bind(p.rating)
        .bind(p.num_reviews)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(products.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products() {
        let products = sample_products();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.price > Decimal::ZERO));
        assert_eq!(products.iter().filter(|p| p.count_in_stock == 0).count(), 1);
    }
}
