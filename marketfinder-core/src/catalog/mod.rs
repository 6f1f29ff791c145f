//! Facet categories and the code/label registry shared by slugs and
//! predicates.
//!
//! A [`FacetCatalog`] is built once at start-up and never mutated afterwards.
//! Each category keeps its entries in display order together with a reverse
//! table from slug fragment to code, so decoding a slug never re-derives
//! fragments from labels at request time. Declared aliases live in the same
//! table and keep older URLs resolvable after a label is edited.

mod builtin;

use std::{
    collections::{HashMap, HashSet},
    fmt,
    io::Read,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slug::slugify;

/// Facet categories in slug order.
///
/// The declaration order is significant: it fixes the order in which clauses
/// appear in a slug and the order of filter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Ownership diversity of the business running the listing.
    Diversity,
    /// Production or practice method.
    Production,
    /// Accepted payment type.
    Payments,
    /// Food and nutrition assistance program.
    Fnap,
    /// Free-text location matched against the listing address.
    #[serde(rename = "city_state")]
    Location,
}

impl Category {
    /// Every category in slug order.
    pub const ALL: [Self; 5] = [
        Self::Diversity,
        Self::Production,
        Self::Payments,
        Self::Fnap,
        Self::Location,
    ];

    /// Categories whose values are catalog codes.
    pub const CODED: [Self; 4] = [Self::Diversity, Self::Production, Self::Payments, Self::Fnap];

    /// Stable identifier used in selections and filter payloads.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Diversity => "diversity",
            Self::Production => "production",
            Self::Payments => "payments",
            Self::Fnap => "fnap",
            Self::Location => "city_state",
        }
    }

    /// Whether values in this category are catalog codes rather than free text.
    #[must_use]
    pub const fn is_coded(self) -> bool {
        !matches!(self, Self::Location)
    }

    pub(crate) const fn default_title(self) -> &'static str {
        match self {
            Self::Diversity => "Diversity",
            Self::Production => "Production/Practice Methods",
            Self::Payments => "Accepted Payments",
            Self::Fnap => "Eligible Benefits Programs",
            Self::Location => "Cities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Errors raised when a selection refers to something the catalog lacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetError {
    /// The code is not registered for the category.
    #[error("unknown {category} code `{code}`")]
    UnknownCode {
        /// Category the code was supplied for.
        category: Category,
        /// Offending code.
        code: String,
    },
}

/// Errors raised while building a [`FacetCatalog`] from a definition.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog definition was not valid JSON.
    #[error("failed to parse catalog definition: {source}")]
    Parse {
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A category was defined more than once.
    #[error("category {category} is defined more than once")]
    DuplicateCategory {
        /// Repeated category.
        category: Category,
    },
    /// The location category was given fixed entries.
    #[error("the {category} category takes free text and cannot declare entries")]
    LocationEntries {
        /// Category that carried entries.
        category: Category,
    },
    /// A code appears more than once across the catalog.
    #[error("code `{code}` is defined more than once")]
    DuplicateCode {
        /// Repeated code.
        code: String,
    },
    /// A code cannot be used as a storage column name.
    #[error("code `{code}` must be non-empty ASCII letters, digits or underscores")]
    InvalidCode {
        /// Rejected code.
        code: String,
    },
    /// A label or alias produces no slug fragment.
    #[error("label or alias for `{code}` produces an empty slug fragment")]
    EmptyFragment {
        /// Code whose label or alias is empty.
        code: String,
    },
    /// Two entries in one category share a slug fragment.
    #[error("{category} codes `{first}` and `{second}` share the slug fragment `{fragment}`")]
    FragmentCollision {
        /// Category holding both entries.
        category: Category,
        /// Shared fragment.
        fragment: String,
        /// Code registered first.
        first: String,
        /// Code that collided with it.
        second: String,
    },
}

/// Serializable catalog definition, as read from a deployment's JSON file.
///
/// # Examples
///
/// ```
/// use marketfinder_core::{CatalogSpec, Category, FacetCatalog};
///
/// let json = r#"{
///     "categories": [
///         {"id": "payments", "title": "Payments", "entries": [
///             {"code": "pay_cash", "label": "Cash"}
///         ]}
///     ]
/// }"#;
/// let catalog = FacetCatalog::from_json_reader(json.as_bytes()).expect("valid catalog");
/// assert_eq!(catalog.label_for(Category::Payments, "pay_cash"), Ok("Cash"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
    /// Category definitions; missing categories are created empty.
    pub categories: Vec<CategorySpec>,
}

impl CatalogSpec {
    /// Definition of the built-in farmers-market catalog.
    #[must_use]
    pub fn farmers_markets() -> Self {
        builtin::spec()
    }
}

/// Definition of a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Category identifier.
    pub id: Category,
    /// Display title for filter groups.
    pub title: String,
    /// Entries in display order.
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
}

/// Definition of a single code/label pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Code, also the storage flag column.
    pub code: String,
    /// Display label; its slug fragment is derived from it.
    pub label: String,
    /// Extra slug fragments that decode to this code.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A registered code with its label and slug fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetEntry {
    code: String,
    label: String,
    fragment: String,
    aliases: Vec<String>,
}

impl FacetEntry {
    /// Facet code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical slug fragment derived from the label.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Additional fragments accepted when decoding.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// One category of the catalog with its ordered entries.
#[derive(Debug, Clone)]
pub struct FacetCategory {
    category: Category,
    title: String,
    entries: Vec<FacetEntry>,
    reverse: HashMap<String, usize>,
}

impl FacetCategory {
    /// Category identifier.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[FacetEntry] {
        &self.entries
    }

    /// Look up an entry by code.
    #[must_use]
    pub fn entry(&self, code: &str) -> Option<&FacetEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// Every fragment in the reverse table with the code it decodes to.
    ///
    /// Fragments come in entry order, each entry's derived fragment before
    /// its aliases.
    pub fn fragments(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().flat_map(|entry| {
            std::iter::once(&entry.fragment)
                .chain(&entry.aliases)
                .map(|fragment| (fragment.as_str(), entry.code.as_str()))
        })
    }

    fn code_for_slug_fragment(&self, fragment: &str) -> Option<&str> {
        self.reverse
            .get(fragment)
            .and_then(|index| self.entries.get(*index))
            .map(|entry| entry.code.as_str())
    }

    fn assemble(category: Category, title: String, specs: Vec<EntrySpec>) -> Self {
        let mut entries = Vec::with_capacity(specs.len());
        let mut reverse = HashMap::new();
        for (index, spec) in specs.into_iter().enumerate() {
            let fragment = slugify(&spec.label);
            reverse.entry(fragment.clone()).or_insert(index);
            let mut aliases: Vec<String> = Vec::with_capacity(spec.aliases.len());
            for alias in spec.aliases.iter().map(|alias| slugify(alias)) {
                if alias != fragment && !aliases.contains(&alias) {
                    reverse.entry(alias.clone()).or_insert(index);
                    aliases.push(alias);
                }
            }
            entries.push(FacetEntry {
                code: spec.code,
                label: spec.label,
                fragment,
                aliases,
            });
        }
        Self {
            category,
            title,
            entries,
            reverse,
        }
    }
}

/// Immutable registry of facet categories.
///
/// # Examples
///
/// ```
/// use marketfinder_core::{Category, FacetCatalog};
///
/// let catalog = FacetCatalog::farmers_markets();
/// assert_eq!(
///     catalog.label_for(Category::Production, "specialproductionmethods_6"),
///     Ok("Non-GMO"),
/// );
/// assert_eq!(
///     catalog.code_for_label_fragment(Category::Payments, "Cash;SNAP"),
///     Some("acceptedpayment_3"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FacetCatalog {
    categories: Vec<FacetCategory>,
}

impl FacetCatalog {
    /// The built-in farmers-market catalog.
    #[must_use]
    pub fn farmers_markets() -> Self {
        Self::assemble(CatalogSpec::farmers_markets())
    }

    /// Validate a definition and build the catalog from it.
    pub fn from_spec(spec: CatalogSpec) -> Result<Self, CatalogError> {
        validate(&spec)?;
        Ok(Self::assemble(spec))
    }

    /// Read a JSON definition and build the catalog from it.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let spec: CatalogSpec =
            serde_json::from_reader(reader).map_err(|source| CatalogError::Parse { source })?;
        Self::from_spec(spec)
    }

    /// Categories in slug order. Every [`Category`] is present.
    #[must_use]
    pub fn categories(&self) -> &[FacetCategory] {
        &self.categories
    }

    /// Look up a category.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&FacetCategory> {
        self.categories
            .iter()
            .find(|candidate| candidate.category == category)
    }

    /// Display label for a code.
    pub fn label_for(&self, category: Category, code: &str) -> Result<&str, FacetError> {
        self.entry(category, code).map(FacetEntry::label)
    }

    /// Entry registered for a code.
    pub fn entry(&self, category: Category, code: &str) -> Result<&FacetEntry, FacetError> {
        self.category(category)
            .and_then(|facet| facet.entry(code))
            .ok_or_else(|| FacetError::UnknownCode {
                category,
                code: code.to_owned(),
            })
    }

    /// First code, in catalog order, whose label occurs in `text`.
    ///
    /// Matching ignores case. This is used for free-text fields such as
    /// `"Cash;Debit card/Credit card"`.
    #[must_use]
    pub fn code_for_label_fragment(&self, category: Category, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.category(category)?
            .entries
            .iter()
            .find(|entry| haystack.contains(&entry.label.to_lowercase()))
            .map(|entry| entry.code.as_str())
    }

    /// Code whose slug fragment or alias is exactly `fragment`.
    #[must_use]
    pub fn code_for_slug_fragment(&self, category: Category, fragment: &str) -> Option<&str> {
        self.category(category)?.code_for_slug_fragment(fragment)
    }

    /// Every registered code across all categories.
    pub fn codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories
            .iter()
            .flat_map(|facet| facet.entries.iter().map(|entry| entry.code.as_str()))
    }

    fn assemble(spec: CatalogSpec) -> Self {
        let mut definitions = spec.categories;
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let position = definitions
                    .iter()
                    .position(|definition| definition.id == category);
                match position {
                    Some(index) => {
                        let definition = definitions.swap_remove(index);
                        FacetCategory::assemble(category, definition.title, definition.entries)
                    }
                    None => FacetCategory::assemble(
                        category,
                        category.default_title().to_owned(),
                        Vec::new(),
                    ),
                }
            })
            .collect();
        Self { categories }
    }
}

fn validate(spec: &CatalogSpec) -> Result<(), CatalogError> {
    let mut seen_categories = HashSet::new();
    let mut seen_codes = HashSet::new();
    for definition in &spec.categories {
        if !seen_categories.insert(definition.id) {
            return Err(CatalogError::DuplicateCategory {
                category: definition.id,
            });
        }
        if !definition.id.is_coded() && !definition.entries.is_empty() {
            return Err(CatalogError::LocationEntries {
                category: definition.id,
            });
        }
        let mut fragments: HashMap<String, &str> = HashMap::new();
        for entry in &definition.entries {
            if !is_valid_code(&entry.code) {
                return Err(CatalogError::InvalidCode {
                    code: entry.code.clone(),
                });
            }
            if !seen_codes.insert(entry.code.as_str()) {
                return Err(CatalogError::DuplicateCode {
                    code: entry.code.clone(),
                });
            }
            let keys = std::iter::once(&entry.label).chain(entry.aliases.iter());
            for text in keys {
                let fragment = slugify(text);
                if fragment.is_empty() {
                    return Err(CatalogError::EmptyFragment {
                        code: entry.code.clone(),
                    });
                }
                match fragments.get(&fragment) {
                    Some(first) if *first != entry.code => {
                        return Err(CatalogError::FragmentCollision {
                            category: definition.id,
                            fragment,
                            first: (*first).to_owned(),
                            second: entry.code.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        fragments.insert(fragment, &entry.code);
                    }
                }
            }
        }
    }
    Ok(())
}

fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
}
