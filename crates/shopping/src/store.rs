use larder_db::table::ShoppingListEntry;
use larder_shared::{Result, Shortfall, invalid, new_id, normalize_name, not_found, unix_now};
use sea_query::{Alias, Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

/// One shopping-list row. `required_quantity` tracks what the recipes need in
/// aggregate, `to_buy_quantity` what the user still intends to buy; the two
/// only diverge on a manual edit. An entry is ACTIVE until settlement flips
/// it to COMPLETED, which is terminal.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListEntryRow {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub name_normalized: String,
    pub required_quantity: f64,
    pub to_buy_quantity: f64,
    pub unit: String,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub added_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Clone)]
pub struct ShoppingListStore {
    pool: SqlitePool,
}

fn columns() -> [ShoppingListEntry; 12] {
    [
        ShoppingListEntry::Id,
        ShoppingListEntry::HouseholdId,
        ShoppingListEntry::Name,
        ShoppingListEntry::NameNormalized,
        ShoppingListEntry::RequiredQuantity,
        ShoppingListEntry::ToBuyQuantity,
        ShoppingListEntry::Unit,
        ShoppingListEntry::Category,
        ShoppingListEntry::Notes,
        ShoppingListEntry::IsCompleted,
        ShoppingListEntry::AddedAt,
        ShoppingListEntry::CompletedAt,
    ]
}

impl ShoppingListStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active (not yet purchased) entries, oldest first.
    pub async fn active(&self, household_id: &str) -> Result<Vec<ShoppingListEntryRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(ShoppingListEntry::Table)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .order_by_expr(Expr::col(ShoppingListEntry::AddedAt), Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(
            sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Completed entries, most recent purchase first.
    pub async fn history(&self, household_id: &str) -> Result<Vec<ShoppingListEntryRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(ShoppingListEntry::Table)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(true))
            .order_by_expr(Expr::col(ShoppingListEntry::CompletedAt), Order::Desc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(
            sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn get(&self, household_id: &str, id: &str) -> Result<Option<ShoppingListEntryRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(ShoppingListEntry::Table)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(
            sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_active_by_name(
        &self,
        household_id: &str,
        name: &str,
    ) -> Result<Option<ShoppingListEntryRow>> {
        let statement = Query::select()
            .columns(columns())
            .from(ShoppingListEntry::Table)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::NameNormalized).eq(normalize_name(name)))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(
            sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Merge one shortfall into the active list: insert a new entry, or add
    /// the quantity onto the existing active entry with the same normalized
    /// name. One statement keyed on the partial unique index, so concurrent
    /// calls for the same ingredient converge to a single active entry
    /// carrying the summed quantity instead of racing lookup-then-write.
    pub async fn upsert_increment(
        &self,
        household_id: &str,
        shortfall: &Shortfall,
    ) -> Result<ShoppingListEntryRow> {
        let statement = Query::insert()
            .into_table(ShoppingListEntry::Table)
            .columns(columns())
            .values_panic([
                new_id().into(),
                household_id.into(),
                shortfall.name.trim().into(),
                normalize_name(&shortfall.name).into(),
                shortfall.quantity.into(),
                shortfall.quantity.into(),
                shortfall.unit.clone().into(),
                shortfall.category.map(|c| c.to_string()).into(),
                Option::<String>::None.into(),
                false.into(),
                unix_now().into(),
                Option::<i64>::None.into(),
            ])
            .on_conflict(
                OnConflict::columns([
                    ShoppingListEntry::HouseholdId,
                    ShoppingListEntry::NameNormalized,
                ])
                // SQLite matches a partial-index ON CONFLICT target only when
                // the predicate is a literal; a bound `?` (what `.eq(false)`
                // renders under build_sqlx) never matches. Inline FALSE so it
                // lines up with the index's `WHERE "is_completed" = FALSE`.
                .target_and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(Expr::cust("FALSE")))
                .value(
                    ShoppingListEntry::RequiredQuantity,
                    Expr::col((ShoppingListEntry::Table, ShoppingListEntry::RequiredQuantity)).add(
                        Expr::col((Alias::new("excluded"), ShoppingListEntry::RequiredQuantity)),
                    ),
                )
                .value(
                    ShoppingListEntry::ToBuyQuantity,
                    Expr::col((ShoppingListEntry::Table, ShoppingListEntry::ToBuyQuantity)).add(
                        Expr::col((Alias::new("excluded"), ShoppingListEntry::ToBuyQuantity)),
                    ),
                )
                .to_owned(),
            )
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(
            sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Manual edit of the amount still to buy on an active entry. This is the
    /// one operation that lets `to_buy_quantity` diverge from
    /// `required_quantity`.
    pub async fn set_to_buy_quantity(
        &self,
        household_id: &str,
        id: &str,
        quantity: f64,
    ) -> Result<ShoppingListEntryRow> {
        if !quantity.is_finite() || quantity <= 0.0 {
            invalid!("to-buy quantity must be positive");
        }

        let statement = Query::update()
            .table(ShoppingListEntry::Table)
            .value(ShoppingListEntry::ToBuyQuantity, quantity)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::Id).eq(id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some(row) = sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?
        else {
            not_found!("active shopping-list entry {id}");
        };

        Ok(row)
    }

    /// Attach or clear a free-text note on an active entry.
    pub async fn set_notes(
        &self,
        household_id: &str,
        id: &str,
        notes: Option<String>,
    ) -> Result<ShoppingListEntryRow> {
        let statement = Query::update()
            .table(ShoppingListEntry::Table)
            .value(ShoppingListEntry::Notes, notes)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::Id).eq(id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .returning_all()
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some(row) = sqlx::query_as_with::<_, ShoppingListEntryRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?
        else {
            not_found!("active shopping-list entry {id}");
        };

        Ok(row)
    }

    /// Drop an active entry without settling it (the user decided not to buy).
    pub async fn remove_active(&self, household_id: &str, id: &str) -> Result<()> {
        let statement = Query::delete()
            .from_table(ShoppingListEntry::Table)
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::Id).eq(id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            not_found!("active shopping-list entry {id}");
        }

        Ok(())
    }

    pub async fn complete(&self, household_id: &str, id: &str) -> Result<bool> {
        Self::complete_on(&self.pool, household_id, id).await
    }

    /// Flip an active entry to the terminal COMPLETED state. Returns false
    /// when the entry was already completed; the transition is one-way and
    /// the conditional update makes it safe to race.
    pub async fn complete_on<'e, E>(executor: E, household_id: &str, id: &str) -> Result<bool>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let statement = Query::update()
            .table(ShoppingListEntry::Table)
            .value(ShoppingListEntry::IsCompleted, true)
            .value(ShoppingListEntry::CompletedAt, unix_now())
            .and_where(Expr::col(ShoppingListEntry::HouseholdId).eq(household_id))
            .and_where(Expr::col(ShoppingListEntry::Id).eq(id))
            .and_where(Expr::col(ShoppingListEntry::IsCompleted).eq(false))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(executor).await?;

        Ok(result.rows_affected() == 1)
    }
}
