//! Server-side cart service
//!
//! One cart per user; its lines live in a JSONB column and are merged by
//! product on every read and write.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{merge_and_check, merge_cart_items, Cart, CartError, CartItem};

/// Cart row as stored
#[derive(Debug, FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    cart_items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            user_id: row.user_id,
            cart_items: row.cart_items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        AppError::Validation {
            field: "cartItems".to_string(),
            message: err.to_string(),
        }
    }
}

const CART_COLUMNS: &str = "id, user_id, cart_items, created_at, updated_at";

/// Cart service
#[derive(Clone)]
pub struct CartService {
    db: PgPool,
}

impl CartService {
    /// Create a new CartService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_cart(&self, user_id: Uuid) -> AppResult<Option<CartRow>> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {} FROM carts WHERE user_id = $1",
            CART_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn insert_cart(&self, user_id: Uuid, items: Vec<CartItem>) -> AppResult<Cart> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            r#"
            INSERT INTO carts (user_id, cart_items) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET cart_items = EXCLUDED.cart_items, updated_at = NOW()
            RETURNING {}
            "#,
            CART_COLUMNS
        ))
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn write_items(&self, cart_id: Uuid, items: Vec<CartItem>) -> AppResult<Cart> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            r#"
            UPDATE carts SET cart_items = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CART_COLUMNS
        ))
        .bind(cart_id)
        .bind(Json(items))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

        Ok(row.into())
    }

    /// The caller's cart with merged lines; the flag is true when it had to be created
    pub async fn get_cart(&self, user_id: Uuid) -> AppResult<(Cart, bool)> {
        let Some(row) = self.find_cart(user_id).await? else {
            let cart = self.insert_cart(user_id, Vec::new()).await?;
            return Ok((cart, true));
        };

        let stored = row.cart_items.0.clone();
        let merged = merge_cart_items(stored.clone());

        if merged == stored {
            return Ok((row.into(), false));
        }

        // Persist the merge so the next read is already clean
        let cart = self.write_items(row.id, merged).await?;
        Ok((cart, false))
    }

    /// Replace the caller's cart; the flag is true when it had to be created
    pub async fn replace_cart(
        &self,
        user_id: Uuid,
        items: Vec<CartItem>,
    ) -> AppResult<(Cart, bool)> {
        let merged = merge_and_check(items)?;

        match self.find_cart(user_id).await? {
            Some(row) => Ok((self.write_items(row.id, merged).await?, false)),
            None => Ok((self.insert_cart(user_id, merged).await?, true)),
        }
    }

    /// Empty the caller's cart
    pub async fn clear_cart(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE carts SET cart_items = '[]'::jsonb, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart".to_string()));
        }

        Ok(())
    }
}
