pub struct Operation;

// At most one active entry per (household, ingredient). Completed rows stay
// behind as history, so the index only covers the active set. sea-query has
// no builder for partial indexes; the statement is spelled out.
const UP: &str = "CREATE UNIQUE INDEX \"idx_shopping_list_entry_active_name\" \
    ON \"shopping_list_entry\" (\"household_id\", \"name_normalized\") \
    WHERE \"is_completed\" = FALSE";

const DOWN: &str = "DROP INDEX \"idx_shopping_list_entry_active_name\"";

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(UP).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(DOWN).execute(connection).await?;

        Ok(())
    }
}
