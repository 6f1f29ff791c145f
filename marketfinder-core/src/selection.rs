//! Per-request facet selections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Chosen facet values, at most one per category.
///
/// Coded categories hold catalog codes; [`Category::Location`] holds free
/// text. Blank values are never stored, so an empty selection and a selection
/// of blank values are the same thing. Serialized as a JSON object keyed by
/// category identifier.
///
/// # Examples
///
/// ```
/// use marketfinder_core::{Category, FacetSelection};
///
/// let selection = FacetSelection::new()
///     .with(Category::Production, "specialproductionmethods_6")
///     .with(Category::Location, "  ");
/// assert_eq!(selection.len(), 1);
/// assert_eq!(selection.get(Category::Location), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Category, String>",
    into = "BTreeMap<Category, String>"
)]
pub struct FacetSelection {
    values: BTreeMap<Category, String>,
}

impl FacetSelection {
    /// Create an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style [`FacetSelection::insert`].
    #[must_use]
    pub fn with(mut self, category: Category, value: impl Into<String>) -> Self {
        self.insert(category, value);
        self
    }

    /// Set the value for a category, replacing any previous one.
    ///
    /// Blank values remove the category instead.
    pub fn insert(&mut self, category: Category, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        if value.trim().is_empty() {
            return self.values.remove(&category);
        }
        self.values.insert(category, value)
    }

    /// Set the value only when the category is still empty.
    ///
    /// Returns `false` when an earlier value was kept.
    pub(crate) fn insert_if_absent(&mut self, category: Category, value: String) -> bool {
        if value.trim().is_empty() || self.values.contains_key(&category) {
            return false;
        }
        self.values.insert(category, value);
        true
    }

    /// Value selected for a category.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&str> {
        self.values.get(&category).map(String::as_str)
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of selected categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Selected values in slug order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
        self.values
            .iter()
            .map(|(category, value)| (*category, value.as_str()))
    }
}

impl From<BTreeMap<Category, String>> for FacetSelection {
    fn from(values: BTreeMap<Category, String>) -> Self {
        values
            .into_iter()
            .fold(Self::new(), |selection, (category, value)| {
                selection.with(category, value)
            })
    }
}

impl From<FacetSelection> for BTreeMap<Category, String> {
    fn from(selection: FacetSelection) -> Self {
        selection.values
    }
}

impl FromIterator<(Category, String)> for FacetSelection {
    fn from_iter<I: IntoIterator<Item = (Category, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |selection, (category, value)| {
                selection.with(category, value)
            })
    }
}
