//! Product catalogue service
//!
//! Handles browsing, search suggestions, reviews and admin maintenance

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    average_rating, CreateReviewInput, Product, ProductDefaults, ProductDetail, ProductInput,
    ProductPage, ProductSuggestion, Review,
};
use shared::types::{Pagination, ProductSort};
use shared::validation::non_blank;

const PRODUCT_COLUMNS: &str = "id, user_id, name, image, brand, category, description, price, \
     count_in_stock, rating, num_reviews, created_at, updated_at";

/// Maximum number of search suggestions
pub const SUGGESTION_LIMIT: i64 = 10;

/// Catalogue filters parsed from the query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Build filters from raw query values; blank or unparsable values are ignored
    pub fn from_query(
        keyword: Option<&str>,
        category: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
        min_rating: Option<&str>,
        sort: Option<&str>,
    ) -> Self {
        let text = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let number = |v: Option<&str>| v.and_then(|s| Decimal::from_str(s.trim()).ok());

        Self {
            keyword: text(keyword),
            category: text(category),
            min_price: number(min_price),
            max_price: number(max_price),
            min_rating: number(min_rating),
            sort: sort.map(ProductSort::parse).unwrap_or_default(),
        }
    }
}

/// Escape LIKE wildcards so the keyword matches literally, then wrap for a substring match
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// One page of the filtered catalogue
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> AppResult<ProductPage> {
        let pattern = filter.keyword.as_deref().map(like_pattern);
        let min_price = filter.min_price.unwrap_or(Decimal::ZERO);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR category = $2)
              AND price >= $3
              AND ($4::numeric IS NULL OR price <= $4)
              AND ($5::numeric IS NULL OR rating >= $5)
            "#,
        )
        .bind(&pattern)
        .bind(&filter.category)
        .bind(min_price)
        .bind(filter.max_price)
        .bind(filter.min_rating)
        .fetch_one(&self.db)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {} FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR category = $2)
              AND price >= $3
              AND ($4::numeric IS NULL OR price <= $4)
              AND ($5::numeric IS NULL OR rating >= $5)
            ORDER BY
              CASE WHEN $6 = 'priceAsc' THEN price END ASC,
              CASE WHEN $6 = 'priceDesc' THEN price END DESC,
              CASE WHEN $6 = 'newest' THEN created_at END DESC,
              CASE WHEN $6 = 'bestRated' THEN rating END DESC,
              created_at ASC, id ASC
            LIMIT $7 OFFSET $8
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&pattern)
        .bind(&filter.category)
        .bind(min_price)
        .bind(filter.max_price)
        .bind(filter.min_rating)
        .bind(filter.sort.as_str())
        .bind(pagination.page_size)
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(ProductPage {
            products,
            page: pagination.page,
            pages: pagination.total_pages(count),
            count,
        })
    }

    /// Up to ten `{_id, name}` matches for search-as-you-type
    pub async fn suggestions(&self, keyword: &str) -> AppResult<Vec<ProductSuggestion>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let suggestions = sqlx::query_as::<_, ProductSuggestion>(
            r#"
            SELECT id, name FROM products
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY created_at ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(like_pattern(keyword))
        .bind(SUGGESTION_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(suggestions)
    }

    /// Fetch a product row
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Product with its reviews
    pub async fn get_product_detail(&self, product_id: Uuid) -> AppResult<ProductDetail> {
        let product = self.get_product(product_id).await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, product_id, user_id, name, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ProductDetail { product, reviews })
    }

    /// Add a review and refresh the product's rating summary
    pub async fn create_review(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        input: CreateReviewInput,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Lock the product so concurrent reviews recompute in turn
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let already_reviewed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews WHERE product_id = $1 AND user_id = $2",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_reviewed > 0 {
            return Err(AppError::BadRequest("Product already reviewed".to_string()));
        }

        let reviewer = sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO reviews (product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .bind(&reviewer)
        .bind(input.rating)
        .bind(input.comment.trim())
        .execute(&mut *tx)
        .await?;

        let ratings = sqlx::query_scalar::<_, i32>("SELECT rating FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET num_reviews = $2, rating = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .bind(ratings.len() as i32)
        .bind(average_rating(&ratings))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    // ========================================================================
    // Admin Operations
    // ========================================================================

    /// Every product, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC, id DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Create a product; missing fields take the sample defaults
    pub async fn create_product(&self, admin_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input
            .check()
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (user_id, name, image, brand, category, description, price, count_in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(admin_id)
        .bind(non_blank(input.name).unwrap_or_else(|| ProductDefaults::NAME.to_string()))
        .bind(non_blank(input.image).unwrap_or_else(|| ProductDefaults::IMAGE.to_string()))
        .bind(non_blank(input.brand).unwrap_or_else(|| ProductDefaults::BRAND.to_string()))
        .bind(non_blank(input.category).unwrap_or_else(|| ProductDefaults::CATEGORY.to_string()))
        .bind(
            non_blank(input.description)
                .unwrap_or_else(|| ProductDefaults::DESCRIPTION.to_string()),
        )
        .bind(input.price.unwrap_or(Decimal::ZERO))
        .bind(input.count_in_stock.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %product.id, admin_id = %admin_id, "Product created");

        Ok(product)
    }

    /// Overwrite the provided fields of a product
    pub async fn update_product(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input
            .check()
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                brand = COALESCE($4, brand),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                price = COALESCE($7, price),
                count_in_stock = COALESCE($8, count_in_stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(non_blank(input.name))
        .bind(non_blank(input.image))
        .bind(non_blank(input.brand))
        .bind(non_blank(input.category))
        .bind(non_blank(input.description))
        .bind(input.price)
        .bind(input.count_in_stock)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Remove a product and its reviews
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(product_id = %product_id, "Product removed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("mug"), "%mug%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_filter_from_query() {
        let filter = ProductFilter::from_query(
            Some("  phone "),
            Some(""),
            Some("10"),
            Some("abc"),
            Some("4.5"),
            Some("priceDesc"),
        );
        assert_eq!(filter.keyword.as_deref(), Some("phone"));
        assert_eq!(filter.category, None);
        assert_eq!(filter.min_price, Some(Decimal::from(10)));
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.min_rating, Some(Decimal::new(45, 1)));
        assert_eq!(filter.sort, ProductSort::PriceDesc);
    }

    #[test]
    fn test_filter_unknown_sort_is_default() {
        let filter = ProductFilter::from_query(None, None, None, None, None, Some("cheapest"));
        assert_eq!(filter.sort, ProductSort::Default);
        assert_eq!(filter, ProductFilter::default());
    }
}
