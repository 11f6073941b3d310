use larder_db::table::InventoryItem;
use larder_shared::{IngredientCategory, Result, invalid, new_id, normalize_name, not_found, unix_now};
use sea_query::{Alias, Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};
use validator::Validate;

/// One pantry row. Owned exclusively by its household; `quantity` never goes
/// negative and deleting a row removes it entirely.
#[derive(Debug, Clone, FromRow)]
pub struct InventoryItemRow {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub name_normalized: String,
    pub quantity: f64,
    pub unit: String,
    pub category: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Validate)]
pub struct NewInventoryItem {
    #[validate(length(min = 1, message = "ingredient name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "quantity cannot be negative"))]
    pub quantity: f64,
    pub unit: String,
    pub category: Option<IngredientCategory>,
}

#[derive(Clone)]
pub struct InventoryStore {
    pool: SqlitePool,
}

fn columns() -> [InventoryItem; 9] {
    [
        InventoryItem::Id,
        InventoryItem::HouseholdId,
        InventoryItem::Name,
        InventoryItem::NameNormalized,
        InventoryItem::Quantity,
        InventoryItem::Unit,
        InventoryItem::Category,
        InventoryItem::CreatedAt,
        InventoryItem::UpdatedAt,
    ]
}

impl InventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Snapshot of a household's pantry in one read, ordered by name. All
    /// lookups of an availability check run against a single such snapshot.
    pub async fn list(&self, household_id: &str) -> Result<Vec<InventoryItemRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(InventoryItem::Table)
            .and_where(Expr::col(InventoryItem::HouseholdId).eq(household_id))
            .order_by_expr(Expr::col(InventoryItem::NameNormalized), Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get(&self, household_id: &str, id: &str) -> Result<Option<InventoryItemRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(InventoryItem::Table)
            .and_where(Expr::col(InventoryItem::HouseholdId).eq(household_id))
            .and_where(Expr::col(InventoryItem::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_name(
        &self,
        household_id: &str,
        name: &str,
    ) -> Result<Option<InventoryItemRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(InventoryItem::Table)
            .and_where(Expr::col(InventoryItem::HouseholdId).eq(household_id))
            .and_where(Expr::col(InventoryItem::NameNormalized).eq(normalize_name(name)))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Add a pantry row. The unique `(household_id, name_normalized)` index
    /// turns a duplicate into a conflict error.
    pub async fn insert(
        &self,
        household_id: &str,
        input: NewInventoryItem,
    ) -> Result<InventoryItemRow> {
        input.validate()?;

        let now = unix_now();
        let statement = Query::insert()
            .into_table(InventoryItem::Table)
            .columns(columns())
            .values_panic([
                new_id().into(),
                household_id.into(),
                input.name.trim().into(),
                normalize_name(&input.name).into(),
                input.quantity.into(),
                input.unit.into(),
                input.category.map(|c| c.to_string()).into(),
                now.into(),
                now.into(),
            ])
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(household_id, name = %row.name, quantity = row.quantity, "added inventory item");

        Ok(row)
    }

    /// Add quantity to an ingredient, creating the row when the household does
    /// not track it yet. Single-statement upsert keyed on the unique name
    /// index, so concurrent settlements converge to the summed quantity.
    pub async fn add_quantity(
        &self,
        household_id: &str,
        name: &str,
        quantity: f64,
        unit: &str,
        category: Option<&str>,
    ) -> Result<InventoryItemRow> {
        Self::add_quantity_on(&self.pool, household_id, name, quantity, unit, category).await
    }

    /// Same as [`add_quantity`](Self::add_quantity) but on a caller-supplied
    /// executor, so settlement can run the increment inside its own
    /// transaction.
    pub async fn add_quantity_on<'e, E>(
        executor: E,
        household_id: &str,
        name: &str,
        quantity: f64,
        unit: &str,
        category: Option<&str>,
    ) -> Result<InventoryItemRow>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        if !quantity.is_finite() || quantity < 0.0 {
            invalid!("cannot add a negative quantity to {name}");
        }

        let now = unix_now();
        let statement = Query::insert()
            .into_table(InventoryItem::Table)
            .columns(columns())
            .values_panic([
                new_id().into(),
                household_id.into(),
                name.trim().into(),
                normalize_name(name).into(),
                quantity.into(),
                unit.into(),
                category.map(|c| c.to_owned()).into(),
                now.into(),
                now.into(),
            ])
            .on_conflict(
                OnConflict::columns([InventoryItem::HouseholdId, InventoryItem::NameNormalized])
                    .value(
                        InventoryItem::Quantity,
                        Expr::col((InventoryItem::Table, InventoryItem::Quantity))
                            .add(Expr::col((Alias::new("excluded"), InventoryItem::Quantity))),
                    )
                    .value(InventoryItem::UpdatedAt, Expr::val(now))
                    .to_owned(),
            )
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_one(executor)
            .await?;

        tracing::debug!(household_id, name = %row.name, quantity = row.quantity, "incremented inventory quantity");

        Ok(row)
    }

    /// Set the absolute quantity after a manual pantry edit.
    pub async fn set_quantity(
        &self,
        household_id: &str,
        id: &str,
        quantity: f64,
    ) -> Result<InventoryItemRow> {
        if !quantity.is_finite() || quantity < 0.0 {
            invalid!("inventory quantity cannot go below zero");
        }

        let statement = Query::update()
            .table(InventoryItem::Table)
            .value(InventoryItem::Quantity, quantity)
            .value(InventoryItem::UpdatedAt, unix_now())
            .and_where(Expr::col(InventoryItem::HouseholdId).eq(household_id))
            .and_where(Expr::col(InventoryItem::Id).eq(id))
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some(row) = sqlx::query_as_with::<_, InventoryItemRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?
        else {
            not_found!("inventory item {id}");
        };

        Ok(row)
    }

    /// Remove an item outright. Deletion is final; no tombstone row remains.
    pub async fn remove(&self, household_id: &str, id: &str) -> Result<()> {
        let statement = Query::delete()
            .from_table(InventoryItem::Table)
            .and_where(Expr::col(InventoryItem::HouseholdId).eq(household_id))
            .and_where(Expr::col(InventoryItem::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            not_found!("inventory item {id}");
        }

        tracing::debug!(household_id, id, "removed inventory item");

        Ok(())
    }
}
