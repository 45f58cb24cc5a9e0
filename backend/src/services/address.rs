//! Address book service

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Address, CreateAddressInput, UpdateAddressInput};
use shared::validation::non_blank;

const ADDRESS_COLUMNS: &str =
    "id, user_id, full_name, address, city, postal_code, country, phone, created_at, updated_at";

/// Address service
#[derive(Clone)]
pub struct AddressService {
    db: PgPool,
}

impl AddressService {
    /// Create a new AddressService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All of a user's addresses, oldest first
    pub async fn list_addresses(&self, user_id: Uuid) -> AppResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {} FROM addresses WHERE user_id = $1 ORDER BY created_at ASC",
            ADDRESS_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(addresses)
    }

    /// Save a new address for a user
    pub async fn create_address(
        &self,
        user_id: Uuid,
        input: CreateAddressInput,
    ) -> AppResult<Address> {
        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            INSERT INTO addresses (user_id, full_name, address, city, postal_code, country, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ADDRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(input.full_name.trim())
        .bind(input.address.trim())
        .bind(input.city.trim())
        .bind(input.postal_code.trim())
        .bind(input.country.trim())
        .bind(non_blank(input.phone))
        .fetch_one(&self.db)
        .await?;

        Ok(address)
    }

    /// Overwrite the non-blank fields of one of the user's addresses
    pub async fn update_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: UpdateAddressInput,
    ) -> AppResult<Address> {
        // Someone else's address is reported exactly like a missing one
        sqlx::query_as::<_, Address>(&format!(
            r#"
            UPDATE addresses SET
                full_name = COALESCE($3, full_name),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                postal_code = COALESCE($6, postal_code),
                country = COALESCE($7, country),
                phone = COALESCE($8, phone),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            ADDRESS_COLUMNS
        ))
        .bind(address_id)
        .bind(user_id)
        .bind(non_blank(input.full_name))
        .bind(non_blank(input.address))
        .bind(non_blank(input.city))
        .bind(non_blank(input.postal_code))
        .bind(non_blank(input.country))
        .bind(non_blank(input.phone))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Address".to_string()))
    }

    /// Delete one of the user's addresses
    pub async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Address".to_string()));
        }

        Ok(())
    }
}
