use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum InventoryItem {
    Table,
    Id,
    HouseholdId,
    Name,
    NameNormalized,
    Quantity,
    Unit,
    Category,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum ShoppingListEntry {
    Table,
    Id,
    HouseholdId,
    Name,
    NameNormalized,
    RequiredQuantity,
    ToBuyQuantity,
    Unit,
    Category,
    Notes,
    IsCompleted,
    AddedAt,
    CompletedAt,
}
