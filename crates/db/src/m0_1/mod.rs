mod inventory_item_create_household_name_idx;
mod inventory_item_create_table;
mod shopping_list_entry_create_active_name_idx;
mod shopping_list_entry_create_table;

use sqlx_migrator::vec_box;

pub struct M0_1;

sqlx_migrator::sqlite_migration!(
    M0_1,
    "main",
    "m0_1",
    vec_box![],
    vec_box![
        inventory_item_create_table::Operation,
        inventory_item_create_household_name_idx::Operation,
        shopping_list_entry_create_table::Operation,
        shopping_list_entry_create_active_name_idx::Operation
    ]
);
