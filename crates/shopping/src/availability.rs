use std::collections::HashMap;

use larder_inventory::InventoryItemRow;
use larder_shared::{IngredientRequirement, Shortfall, normalize_name};

/// A requirement only partially covered by the pantry.
#[derive(Debug, Clone, PartialEq)]
pub struct LowStockRequirement {
    pub requirement: IngredientRequirement,
    pub available_quantity: f64,
    pub shortfall: f64,
}

/// Per-item data problems found while checking a meal. Collected and
/// reported, never fatal: one malformed requirement must not fail the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQualityWarning {
    MissingName {
        index: usize,
    },
    InvalidQuantity {
        name: String,
        quantity: f64,
    },
    UnitMismatch {
        name: String,
        required_unit: String,
        inventory_unit: String,
    },
}

/// Partition of a meal's requirements against one pantry snapshot.
///
/// Derived data: recomputed on every check, never cached across inventory
/// mutations. Every well-formed requirement lands in exactly one of the three
/// lists.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityResult {
    pub available: Vec<IngredientRequirement>,
    pub low_stock: Vec<LowStockRequirement>,
    pub out_of_stock: Vec<IngredientRequirement>,
    pub warnings: Vec<DataQualityWarning>,
}

impl AvailabilityResult {
    /// Shortfalls ready to hand to the reconciler: the missing part of every
    /// low-stock requirement plus the full quantity of every out-of-stock one.
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        let mut shortfalls = Vec::with_capacity(self.low_stock.len() + self.out_of_stock.len());

        for low in &self.low_stock {
            shortfalls.push(Shortfall {
                name: low.requirement.name.clone(),
                quantity: low.shortfall,
                unit: low.requirement.unit.clone(),
                category: None,
            });
        }

        for requirement in &self.out_of_stock {
            shortfalls.push(Shortfall {
                name: requirement.name.clone(),
                quantity: requirement.quantity,
                unit: requirement.unit.clone(),
                category: None,
            });
        }

        shortfalls
    }
}

/// Stateless domain service partitioning meal requirements into
/// available / low-stock / out-of-stock against a pantry snapshot.
///
/// Matching is case-insensitive exact name equality. No unit conversion is
/// attempted: quantities are compared as-is and a differing unit only raises
/// a [`DataQualityWarning::UnitMismatch`].
pub struct AvailabilityChecker;

impl AvailabilityChecker {
    pub fn check(
        requirements: &[IngredientRequirement],
        inventory: &[InventoryItemRow],
    ) -> AvailabilityResult {
        let by_name: HashMap<&str, &InventoryItemRow> = inventory
            .iter()
            .map(|item| (item.name_normalized.as_str(), item))
            .collect();

        let mut result = AvailabilityResult::default();

        for (index, requirement) in requirements.iter().enumerate() {
            if requirement.name.trim().is_empty() {
                result
                    .warnings
                    .push(DataQualityWarning::MissingName { index });
                continue;
            }

            if !requirement.quantity.is_finite() || requirement.quantity < 0.0 {
                result.warnings.push(DataQualityWarning::InvalidQuantity {
                    name: requirement.name.clone(),
                    quantity: requirement.quantity,
                });
                continue;
            }

            // Zero need is always satisfied, stocked or not.
            if requirement.quantity == 0.0 {
                result.available.push(requirement.clone());
                continue;
            }

            let Some(item) = by_name.get(normalize_name(&requirement.name).as_str()) else {
                result.out_of_stock.push(requirement.clone());
                continue;
            };

            if !item
                .unit
                .trim()
                .eq_ignore_ascii_case(requirement.unit.trim())
            {
                result.warnings.push(DataQualityWarning::UnitMismatch {
                    name: requirement.name.clone(),
                    required_unit: requirement.unit.clone(),
                    inventory_unit: item.unit.clone(),
                });
            }

            if item.quantity >= requirement.quantity {
                result.available.push(requirement.clone());
            } else if item.quantity > 0.0 {
                result.low_stock.push(LowStockRequirement {
                    available_quantity: item.quantity,
                    shortfall: (requirement.quantity - item.quantity).max(0.0),
                    requirement: requirement.clone(),
                });
            } else {
                result.out_of_stock.push(requirement.clone());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(name: &str, quantity: f64, unit: &str) -> IngredientRequirement {
        IngredientRequirement {
            name: name.to_owned(),
            quantity,
            unit: unit.to_owned(),
            is_main: false,
        }
    }

    fn item(name: &str, quantity: f64, unit: &str) -> InventoryItemRow {
        InventoryItemRow {
            id: format!("item-{name}"),
            household_id: "house-1".to_owned(),
            name: name.to_owned(),
            name_normalized: normalize_name(name),
            quantity,
            unit: unit.to_owned(),
            category: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_partitions_requirements() {
        // Pantry: 2 tomatoes. Meal: 5 tomatoes, 3 eggs.
        let inventory = vec![item("tomato", 2.0, "piece")];
        let requirements = vec![
            requirement("Tomato", 5.0, "piece"),
            requirement("egg", 3.0, "piece"),
        ];

        let result = AvailabilityChecker::check(&requirements, &inventory);

        assert!(result.available.is_empty());
        assert_eq!(result.low_stock.len(), 1);
        assert_eq!(result.low_stock[0].available_quantity, 2.0);
        assert_eq!(result.low_stock[0].shortfall, 3.0);
        assert_eq!(result.out_of_stock.len(), 1);
        assert_eq!(result.out_of_stock[0].name, "egg");
        assert!(result.warnings.is_empty());

        let shortfalls = result.shortfalls();
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].name, "Tomato");
        assert_eq!(shortfalls[0].quantity, 3.0);
        assert_eq!(shortfalls[1].name, "egg");
        assert_eq!(shortfalls[1].quantity, 3.0);
    }

    #[test]
    fn test_every_requirement_lands_in_exactly_one_partition() {
        let inventory = vec![
            item("flour", 500.0, "g"),
            item("sugar", 20.0, "g"),
            item("butter", 0.0, "g"),
        ];
        let requirements = vec![
            requirement("flour", 300.0, "g"),
            requirement("sugar", 100.0, "g"),
            requirement("butter", 50.0, "g"),
            requirement("vanilla", 1.0, "tsp"),
        ];

        let result = AvailabilityChecker::check(&requirements, &inventory);

        let total = result.available.len() + result.low_stock.len() + result.out_of_stock.len();
        assert_eq!(total, requirements.len());

        assert_eq!(result.available[0].name, "flour");
        assert_eq!(result.low_stock[0].requirement.name, "sugar");
        // Zero stock counts as out of stock, same as no row at all.
        assert_eq!(result.out_of_stock[0].name, "butter");
        assert_eq!(result.out_of_stock[1].name, "vanilla");
    }

    #[test]
    fn test_zero_quantity_requirement_is_always_available() {
        let result = AvailabilityChecker::check(&[requirement("saffron", 0.0, "g")], &[]);

        assert_eq!(result.available.len(), 1);
        assert!(result.out_of_stock.is_empty());
    }

    #[test]
    fn test_exact_stock_is_available() {
        let inventory = vec![item("rice", 200.0, "g")];
        let result =
            AvailabilityChecker::check(&[requirement("rice", 200.0, "g")], &inventory);

        assert_eq!(result.available.len(), 1);
        assert!(result.low_stock.is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let inventory = vec![item("Olive Oil", 100.0, "ml")];
        let result =
            AvailabilityChecker::check(&[requirement("olive oil", 50.0, "ml")], &inventory);

        assert_eq!(result.available.len(), 1);
    }

    #[test]
    fn test_malformed_requirements_are_skipped_with_warnings() {
        let requirements = vec![
            requirement("", 2.0, "g"),
            requirement("salt", f64::NAN, "g"),
            requirement("pepper", -1.0, "g"),
            requirement("cumin", 1.0, "g"),
        ];

        let result = AvailabilityChecker::check(&requirements, &[]);

        assert_eq!(result.warnings.len(), 3);
        assert_eq!(result.warnings[0], DataQualityWarning::MissingName { index: 0 });
        // The rest of the batch is still classified.
        assert_eq!(result.out_of_stock.len(), 1);
        assert_eq!(result.out_of_stock[0].name, "cumin");
    }

    #[test]
    fn test_unit_mismatch_is_flagged_not_converted() {
        let inventory = vec![item("milk", 1.0, "l")];
        let result = AvailabilityChecker::check(&[requirement("milk", 200.0, "ml")], &inventory);

        // Quantities are compared as-is: 1.0 < 200.0, so low stock.
        assert_eq!(result.low_stock.len(), 1);
        assert_eq!(
            result.warnings,
            vec![DataQualityWarning::UnitMismatch {
                name: "milk".to_owned(),
                required_unit: "ml".to_owned(),
                inventory_unit: "l".to_owned(),
            }]
        );
    }

    #[test]
    fn test_empty_requirements_give_empty_result() {
        let result = AvailabilityChecker::check(&[], &[item("tomato", 2.0, "piece")]);

        assert!(result.available.is_empty());
        assert!(result.low_stock.is_empty());
        assert!(result.out_of_stock.is_empty());
        assert!(result.warnings.is_empty());
    }
}
