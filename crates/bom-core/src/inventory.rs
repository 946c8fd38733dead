//! Inventory records and the per-category lookup index.
//!
//! The index is built eagerly from one or more ordered sources and validates
//! its input as it goes: rows that share an IPN must agree on category,
//! canonical value and package (they are sourcing alternates differing only
//! in supplier/priority fields). A disagreement cannot be repaired locally
//! and aborts before matching with [`InventoryConflictError`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CanonicalValue, Category, PropertyMap};

/// One sourceable inventory row. Immutable within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Internal part number grouping electrically-equivalent alternates.
    pub ipn: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CanonicalValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Supplier preference rank; lower is more preferred.
    pub priority: u32,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    /// Provenance label of the source this row came from.
    #[serde(default)]
    pub source: String,
}

impl InventoryItem {
    /// Case-insensitive property lookup with trimming; empty values read
    /// as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Fatal data-integrity error: two rows share an IPN but disagree on a
/// field that defines the part itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "inventory conflict for IPN '{ipn}': {field} mismatch between row from \
     '{first_source}' and row from '{second_source}'"
)]
pub struct InventoryConflictError {
    pub ipn: String,
    pub field: &'static str,
    pub first_source: String,
    pub second_source: String,
}

/// Per-category lookup over an ordered item arena.
#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    items: Vec<InventoryItem>,
    by_category: HashMap<Category, Vec<usize>>,
}

impl InventoryIndex {
    /// Build the index from ordered sources, validating IPN agreement.
    pub fn build(
        sources: impl IntoIterator<Item = InventoryItem>,
    ) -> Result<Self, InventoryConflictError> {
        let mut index = InventoryIndex::default();
        let mut first_by_ipn: HashMap<String, usize> = HashMap::new();

        for item in sources {
            if let Some(&prior_idx) = first_by_ipn.get(&item.ipn) {
                validate_alternate(&index.items[prior_idx], &item)?;
            } else {
                first_by_ipn.insert(item.ipn.clone(), index.items.len());
            }

            index
                .by_category
                .entry(item.category)
                .or_default()
                .push(index.items.len());
            index.items.push(item);
        }

        log::debug!(
            "inventory index built: {} rows, {} categories",
            index.items.len(),
            index.by_category.len()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// All rows of a category, in source order.
    pub fn candidates(&self, category: Category) -> impl Iterator<Item = &InventoryItem> {
        self.by_category
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.items[i])
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.by_category
            .get(&category)
            .is_some_and(|v| !v.is_empty())
    }
}

fn validate_alternate(
    first: &InventoryItem,
    second: &InventoryItem,
) -> Result<(), InventoryConflictError> {
    let conflict = |field: &'static str| InventoryConflictError {
        ipn: first.ipn.clone(),
        field,
        first_source: first.source.clone(),
        second_source: second.source.clone(),
    };

    if first.category != second.category {
        return Err(conflict("category"));
    }
    if first.value != second.value {
        return Err(conflict("canonical value"));
    }
    if first.package != second.package {
        return Err(conflict("package"));
    }
    Ok(())
}
