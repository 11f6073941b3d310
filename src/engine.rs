use larder_inventory::InventoryStore;
use larder_shared::{IngredientRequirement, Result, Shortfall, not_found};
use larder_shopping::{
    AvailabilityChecker, AvailabilityResult, PurchaseSettlement, ReconcileOutcome,
    SettlementOutcome, ShoppingListReconciler, ShoppingListStore,
};
use sqlx::SqlitePool;

/// External recipe/meal-plan collaborator. Resolves a meal id to its required
/// ingredient list; `None` means the meal does not exist for that household.
#[async_trait::async_trait]
pub trait MealPlanProvider: Send + Sync {
    async fn requirements(
        &self,
        household_id: &str,
        meal_id: &str,
    ) -> Result<Option<Vec<IngredientRequirement>>>;
}

/// Facade wiring the stores to the three operations a host exposes: check a
/// meal's availability, add shortfalls to the shopping list, settle
/// purchases. Every operation is scoped by an explicit household id.
#[derive(Clone)]
pub struct Engine {
    inventory: InventoryStore,
    shopping: ShoppingListStore,
    reconciler: ShoppingListReconciler,
    settlement: PurchaseSettlement,
}

impl Engine {
    pub fn new(pool: SqlitePool) -> Self {
        let shopping = ShoppingListStore::new(pool.clone());

        Self {
            inventory: InventoryStore::new(pool.clone()),
            reconciler: ShoppingListReconciler::new(shopping.clone()),
            settlement: PurchaseSettlement::new(pool),
            shopping,
        }
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    pub fn shopping(&self) -> &ShoppingListStore {
        &self.shopping
    }

    /// Check a planned meal against one consistent pantry snapshot. Malformed
    /// requirements are reported in the result and logged, never fatal.
    pub async fn check_availability(
        &self,
        provider: &dyn MealPlanProvider,
        household_id: &str,
        meal_id: &str,
    ) -> Result<AvailabilityResult> {
        let Some(requirements) = provider.requirements(household_id, meal_id).await? else {
            not_found!("meal {meal_id}");
        };

        let snapshot = self.inventory.list(household_id).await?;
        let result = AvailabilityChecker::check(&requirements, &snapshot);

        for warning in &result.warnings {
            tracing::warn!(
                household_id,
                meal_id,
                ?warning,
                "data quality issue in meal requirements"
            );
        }

        Ok(result)
    }

    /// Merge shortfalls (from an availability check or a manual add) into the
    /// household's shopping list.
    pub async fn add_shortfalls(
        &self,
        household_id: &str,
        shortfalls: &[Shortfall],
    ) -> Result<ReconcileOutcome> {
        self.reconciler.reconcile(household_id, shortfalls).await
    }

    /// Move purchased entries into the pantry.
    pub async fn settle_purchases(
        &self,
        household_id: &str,
        entry_ids: &[String],
    ) -> Result<SettlementOutcome> {
        self.settlement.settle(household_id, entry_ids).await
    }
}
