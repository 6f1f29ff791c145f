//! Turning facet selections into listing predicates.
//!
//! A [`ListingPredicate`] is plain data: a conjunction of [`Condition`]s.
//! Stores translate it into their own query language, and
//! [`ListingPredicate::matches`] evaluates it in memory. Flag conditions only
//! ever carry codes validated against the catalog, so stores can map them to
//! columns without trusting caller input.

use std::sync::Arc;

use crate::{Category, FacetCatalog, FacetError, FacetSelection, Listing};

/// Normalise an address or location for substring comparison: lowercase,
/// commas removed, surrounding whitespace trimmed.
#[must_use]
pub fn normalize_address(text: &str) -> String {
    text.to_lowercase().replace(',', "").trim().to_owned()
}

/// A single constraint on a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The normalised address contains this normalised text.
    AddressContains(String),
    /// The facet flag named by this code is set.
    FlagSet(String),
}

impl Condition {
    /// Evaluate the condition against a listing.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::AddressContains(needle) => listing
                .address
                .as_deref()
                .is_some_and(|address| normalize_address(address).contains(needle.as_str())),
            Self::FlagSet(code) => listing.has_flag(code),
        }
    }
}

/// Conjunction of conditions. The empty predicate matches every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPredicate {
    conditions: Vec<Condition>,
}

impl ListingPredicate {
    /// Predicate matching every listing.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Conditions in the order they were added.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the predicate imposes no constraint.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Require an additional condition.
    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Conjoin two predicates.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// Evaluate every condition against a listing.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(listing))
    }
}

/// Builds predicates from selections, validating codes against the catalog.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use marketfinder_core::{
///     Category, FacetCatalog, FacetSelection, Listing, QueryPredicateBuilder,
/// };
///
/// let builder = QueryPredicateBuilder::new(Arc::new(FacetCatalog::farmers_markets()));
/// let selection = FacetSelection::new().with(Category::Location, "Austin, TX");
/// let predicate = builder.build(&selection).expect("location needs no code");
/// let listing = Listing::new(1, "Downtown").with_address("123 Main St, Austin, TX");
/// assert!(predicate.matches(&listing));
/// ```
#[derive(Debug, Clone)]
pub struct QueryPredicateBuilder {
    catalog: Arc<FacetCatalog>,
}

impl QueryPredicateBuilder {
    /// Create a builder over the catalog.
    #[must_use]
    pub const fn new(catalog: Arc<FacetCatalog>) -> Self {
        Self { catalog }
    }

    /// Build the predicate for a selection.
    ///
    /// Categories without a value impose no constraint. A location that is
    /// blank once normalised imposes none either.
    pub fn build(&self, selection: &FacetSelection) -> Result<ListingPredicate, FacetError> {
        let mut predicate = ListingPredicate::all();
        for (category, value) in selection.iter() {
            if category.is_coded() {
                let entry = self.catalog.entry(category, value)?;
                predicate = predicate.with(Condition::FlagSet(entry.code().to_owned()));
            } else if category == Category::Location {
                let needle = normalize_address(value);
                if !needle.is_empty() {
                    predicate = predicate.with(Condition::AddressContains(needle));
                }
            }
        }
        Ok(predicate)
    }
}
