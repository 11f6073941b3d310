use larder_inventory::InventoryStore;
use larder_shared::Result;
use sqlx::SqlitePool;

use crate::store::ShoppingListStore;

/// Per-entry settlement result. Failures never abort the batch; the caller
/// retries only the ids that did not go through.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementStatus {
    Settled,
    AlreadyCompleted,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct EntrySettlement {
    pub entry_id: String,
    pub status: SettlementStatus,
}

#[derive(Debug, Default)]
pub struct SettlementOutcome {
    pub moved_count: usize,
    pub entries: Vec<EntrySettlement>,
}

/// Moves purchased shopping-list quantities into the pantry.
///
/// Each entry settles in its own transaction: the ACTIVE -> COMPLETED flip
/// and the inventory increment commit together or not at all, and one bad
/// entry leaves the rest of the batch untouched. Re-settling an already
/// completed entry is a no-op since UI retries are expected.
#[derive(Clone)]
pub struct PurchaseSettlement {
    pool: SqlitePool,
    store: ShoppingListStore,
}

impl PurchaseSettlement {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: ShoppingListStore::new(pool.clone()),
            pool,
        }
    }

    pub async fn settle(&self, household_id: &str, entry_ids: &[String]) -> Result<SettlementOutcome> {
        let mut outcome = SettlementOutcome::default();

        for entry_id in entry_ids {
            let status = match self.settle_entry(household_id, entry_id).await {
                Ok(status) => status,
                Err(error) => {
                    tracing::error!(household_id, entry_id, %error, "failed to settle entry");
                    SettlementStatus::Failed(error.to_string())
                }
            };

            if status == SettlementStatus::Settled {
                outcome.moved_count += 1;
            }

            outcome.entries.push(EntrySettlement {
                entry_id: entry_id.clone(),
                status,
            });
        }

        tracing::info!(
            household_id,
            moved = outcome.moved_count,
            requested = entry_ids.len(),
            "settled purchases"
        );

        Ok(outcome)
    }

    async fn settle_entry(&self, household_id: &str, entry_id: &str) -> Result<SettlementStatus> {
        let Some(entry) = self.store.get(household_id, entry_id).await? else {
            return Ok(SettlementStatus::NotFound);
        };

        if entry.is_completed {
            return Ok(SettlementStatus::AlreadyCompleted);
        }

        let mut tx = self.pool.begin().await?;

        // The conditional flip is the guard against a concurrent settle of the
        // same entry: only the transaction that wins it moves the quantity.
        let completed = ShoppingListStore::complete_on(&mut *tx, household_id, entry_id).await?;
        if !completed {
            tx.rollback().await?;
            return Ok(SettlementStatus::AlreadyCompleted);
        }

        InventoryStore::add_quantity_on(
            &mut *tx,
            household_id,
            &entry.name,
            entry.to_buy_quantity,
            &entry.unit,
            entry.category.as_deref(),
        )
        .await?;

        tx.commit().await?;

        tracing::debug!(
            household_id,
            entry_id,
            name = %entry.name,
            quantity = entry.to_buy_quantity,
            "moved purchased quantity into inventory"
        );

        Ok(SettlementStatus::Settled)
    }
}
