//! Repository for the `clients` table.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::client::{Client, CreateClient};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, name, email, phone, created_at, updated_at";

/// Read/create operations for client profiles.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client profile, returning the created row.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (company_id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(company_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    /// Find a client by ID within a company. A client belonging to another
    /// company is indistinguishable from a missing one.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }
}
