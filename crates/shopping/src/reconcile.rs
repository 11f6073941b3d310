use larder_shared::{Result, Shortfall};
use validator::Validate;

use crate::store::{ShoppingListEntryRow, ShoppingListStore};

/// Outcome of a reconcile batch: the entries as they now stand, plus the
/// items that could not be processed. Rejects never abort the batch.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub entries: Vec<ShoppingListEntryRow>,
    pub rejected: Vec<RejectedShortfall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedShortfall {
    pub name: String,
    pub reason: String,
}

/// Merges shortfalls into a household's active shopping list.
///
/// Additive on purpose: reconciling the same shortfall twice doubles the
/// quantity instead of replacing it, because the need compounds across meals.
/// Callers re-checking an unmodified meal are responsible for not submitting
/// it twice. Whatever the interleaving, the store-level upsert guarantees at
/// most one active entry per ingredient name.
#[derive(Clone)]
pub struct ShoppingListReconciler {
    store: ShoppingListStore,
}

impl ShoppingListReconciler {
    pub fn new(store: ShoppingListStore) -> Self {
        Self { store }
    }

    pub async fn reconcile(
        &self,
        household_id: &str,
        shortfalls: &[Shortfall],
    ) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        for shortfall in shortfalls {
            if let Err(errors) = shortfall.validate() {
                outcome.rejected.push(RejectedShortfall {
                    name: shortfall.name.clone(),
                    reason: errors.to_string(),
                });
                continue;
            }

            if !shortfall.quantity.is_finite() {
                outcome.rejected.push(RejectedShortfall {
                    name: shortfall.name.clone(),
                    reason: "quantity is not a number".to_owned(),
                });
                continue;
            }

            // Nothing to buy. Dropped, not an error.
            if shortfall.quantity <= 0.0 {
                tracing::debug!(
                    household_id,
                    name = %shortfall.name,
                    quantity = shortfall.quantity,
                    "skipping shortfall with nothing to buy"
                );
                continue;
            }

            let entry = self.store.upsert_increment(household_id, shortfall).await?;

            tracing::debug!(
                household_id,
                entry_id = %entry.id,
                name = %entry.name,
                to_buy = entry.to_buy_quantity,
                "merged shortfall into shopping list"
            );

            outcome.entries.push(entry);
        }

        if !outcome.rejected.is_empty() {
            tracing::warn!(
                household_id,
                rejected = outcome.rejected.len(),
                "reconcile batch contained malformed shortfalls"
            );
        }

        Ok(outcome)
    }
}
