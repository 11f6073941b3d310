use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::ShoppingListEntry;

pub struct Operation;

fn create_shopping_list_entry_table_statement() -> TableCreateStatement {
    Table::create()
        .table(ShoppingListEntry::Table)
        .col(
            ColumnDef::new(ShoppingListEntry::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(ShoppingListEntry::HouseholdId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(ShoppingListEntry::Name).string().not_null())
        .col(
            ColumnDef::new(ShoppingListEntry::NameNormalized)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(ShoppingListEntry::RequiredQuantity)
                .double()
                .not_null(),
        )
        .col(
            ColumnDef::new(ShoppingListEntry::ToBuyQuantity)
                .double()
                .not_null(),
        )
        .col(ColumnDef::new(ShoppingListEntry::Unit).string().not_null())
        .col(ColumnDef::new(ShoppingListEntry::Category).string().null())
        .col(ColumnDef::new(ShoppingListEntry::Notes).string().null())
        .col(
            ColumnDef::new(ShoppingListEntry::IsCompleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(ShoppingListEntry::AddedAt)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(ShoppingListEntry::CompletedAt)
                .big_integer()
                .null(),
        )
        .to_owned()
}

fn drop_shopping_list_entry_table_statement() -> TableDropStatement {
    Table::drop().table(ShoppingListEntry::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement =
            create_shopping_list_entry_table_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement =
            drop_shopping_list_entry_table_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
