//! Product repository.
//!
//! The `tax` column stores a fraction (`0.16`); every value leaving this
//! module carries a percentage (`16`).

use rust_decimal::Decimal;
use sqlx::PgPool;

use caja_core::dto::products::{NewProduct, Product, UpdateProduct};
use caja_core::{CategoryId, ProductId, UserId, percent_to_rate, rate_to_percent};

use super::{RepositoryError, to_i64, to_u64};

const DUPLICATE_CODE: &str = "barcode already exists";
const MISSING_CATEGORY: &str = "category does not exist";
const REFERENCED: &str = "product is referenced by recorded sales";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    code: String,
    stock: i32,
    is_active: bool,
    price: Decimal,
    cost: Decimal,
    tax: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            category_name: row.category_name,
            code: row.code,
            stock: row.stock,
            is_active: row.is_active,
            price: row.price,
            cost: row.cost,
            tax: rate_to_percent(row.tax),
        }
    }
}

const SELECT_PRODUCT: &str = r"
    SELECT p.id, p.name, p.category_id, c.name AS category_name, p.code, p.stock,
           p.is_active, p.price, p.cost, p.tax
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products with `is_active = status`, ordered by id, plus
    /// the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: bool,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = $1")
            .bind(status)
            .fetch_one(self.pool)
            .await?;

        let sql = format!("{SELECT_PRODUCT} WHERE p.is_active = $1 ORDER BY p.id LIMIT $2 OFFSET $3");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(status)
            .bind(to_i64(limit))
            .bind(to_i64(offset))
            .fetch_all(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), to_u64(total)))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the barcode is already used.
    pub async fn create(
        &self,
        product: &NewProduct,
        created_by: &UserId,
    ) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (category_id, name, code, stock, price, cost, tax,
                                  created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            ",
        )
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.code)
        .bind(product.stock)
        .bind(product.price)
        .bind(product.cost)
        .bind(percent_to_rate(product.tax))
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_CODE, MISSING_CATEGORY))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new barcode is already used.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &UpdateProduct,
        updated_by: &UserId,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products SET
                name        = COALESCE($2, name),
                category_id = COALESCE($3, category_id),
                code        = COALESCE($4, code),
                stock       = COALESCE($5, stock),
                is_active   = COALESCE($6, is_active),
                price       = COALESCE($7, price),
                cost        = COALESCE($8, cost),
                tax         = COALESCE($9, tax),
                updated_by  = $10,
                updated_at  = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.category_id)
        .bind(changes.code.as_deref())
        .bind(changes.stock)
        .bind(changes.is_active)
        .bind(changes.price)
        .bind(changes.cost)
        .bind(changes.tax.map(percent_to_rate))
        .bind(updated_by)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_CODE, MISSING_CATEGORY))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hard-delete a product and return it as it was.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if sales still reference it.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let product = self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, REFERENCED, REFERENCED))?;

        Ok(product)
    }
}
