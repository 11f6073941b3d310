use larder_shared::Shortfall;
use larder_shopping::{PurchaseSettlement, ShoppingListReconciler, ShoppingListStore};

mod helpers;

use helpers::shortfall;

#[tokio::test]
async fn test_reconcile_creates_new_entries() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    let outcome = reconciler
        .reconcile("house-1", &[shortfall("Tomato", 3.0), shortfall("Egg", 6.0)])
        .await?;

    assert_eq!(outcome.entries.len(), 2);
    assert!(outcome.rejected.is_empty());

    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 2);
    for entry in &active {
        assert!(!entry.is_completed);
        assert_eq!(entry.required_quantity, entry.to_buy_quantity);
    }

    Ok(())
}

#[tokio::test]
async fn test_reconcile_twice_accumulates_into_one_entry() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    reconciler
        .reconcile("house-1", &[shortfall("Tomato", 3.0)])
        .await?;
    reconciler
        .reconcile("house-1", &[shortfall("Tomato", 3.0)])
        .await?;

    // The need compounds; the entry does not duplicate.
    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].required_quantity, 6.0);
    assert_eq!(active[0].to_buy_quantity, 6.0);

    Ok(())
}

#[tokio::test]
async fn test_reconcile_merges_names_case_insensitively() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    reconciler
        .reconcile("house-1", &[shortfall("Tomato", 2.0)])
        .await?;
    reconciler
        .reconcile("house-1", &[shortfall("  tomato ", 1.0)])
        .await?;

    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].to_buy_quantity, 3.0);
    // The first spelling wins as display name.
    assert_eq!(active[0].name, "Tomato");

    Ok(())
}

#[tokio::test]
async fn test_reconcile_drops_non_positive_quantities_silently() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    let outcome = reconciler
        .reconcile(
            "house-1",
            &[
                shortfall("Tomato", 0.0),
                shortfall("Egg", -2.0),
                shortfall("Milk", 1.0),
            ],
        )
        .await?;

    assert_eq!(outcome.entries.len(), 1);
    assert!(outcome.rejected.is_empty());

    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Milk");

    Ok(())
}

#[tokio::test]
async fn test_reconcile_reports_missing_name_without_failing_batch() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    let outcome = reconciler
        .reconcile("house-1", &[shortfall("", 2.0), shortfall("Egg", 6.0)])
        .await?;

    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].name, "");
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(store.active("house-1").await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_reconcile_is_scoped_per_household() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    reconciler
        .reconcile("house-1", &[shortfall("Tomato", 2.0)])
        .await?;
    reconciler
        .reconcile("house-2", &[shortfall("Tomato", 5.0)])
        .await?;

    assert_eq!(store.active("house-1").await?[0].to_buy_quantity, 2.0);
    assert_eq!(store.active("house-2").await?[0].to_buy_quantity, 5.0);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_reconciles_keep_single_active_entry() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let reconciler = reconciler.clone();
        handles.push(tokio::spawn(async move {
            let shortfalls = vec![Shortfall {
                name: "Tomato".to_owned(),
                quantity: 1.0,
                unit: "piece".to_owned(),
                category: None,
            }];
            reconciler.reconcile("house-1", &shortfalls).await
        }));
    }

    for result in futures::future::join_all(handles).await {
        result??;
    }

    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].to_buy_quantity, 8.0);
    assert_eq!(active[0].required_quantity, 8.0);

    Ok(())
}

#[tokio::test]
async fn test_completed_entry_does_not_absorb_new_shortfalls() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());
    let settlement = PurchaseSettlement::new(state.pool.clone());

    let outcome = reconciler
        .reconcile("house-1", &[shortfall("Tomato", 2.0)])
        .await?;
    let first_id = outcome.entries[0].id.clone();

    settlement.settle("house-1", &[first_id.clone()]).await?;

    // A fresh shortfall for the same name starts a new active entry; the
    // completed row stays behind as history.
    reconciler
        .reconcile("house-1", &[shortfall("Tomato", 4.0)])
        .await?;

    let active = store.active("house-1").await?;
    assert_eq!(active.len(), 1);
    assert_ne!(active[0].id, first_id);
    assert_eq!(active[0].to_buy_quantity, 4.0);

    let history = store.history("house-1").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, first_id);
    assert_eq!(history[0].to_buy_quantity, 2.0);

    Ok(())
}

#[tokio::test]
async fn test_manual_to_buy_edit_diverges_from_required() -> anyhow::Result<()> {
    let state = helpers::setup().await?;
    let store = ShoppingListStore::new(state.pool.clone());
    let reconciler = ShoppingListReconciler::new(store.clone());

    let outcome = reconciler
        .reconcile("house-1", &[shortfall("Rice", 2.0)])
        .await?;
    let entry_id = outcome.entries[0].id.clone();

    let edited = store.set_to_buy_quantity("house-1", &entry_id, 5.0).await?;
    assert_eq!(edited.to_buy_quantity, 5.0);
    assert_eq!(edited.required_quantity, 2.0);

    // Later reconciles keep incrementing both fields by the same delta.
    reconciler
        .reconcile("house-1", &[shortfall("Rice", 1.0)])
        .await?;
    let active = store.active("house-1").await?;
    assert_eq!(active[0].to_buy_quantity, 6.0);
    assert_eq!(active[0].required_quantity, 3.0);

    Ok(())
}
