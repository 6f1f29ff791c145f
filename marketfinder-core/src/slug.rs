//! Bidirectional mapping between facet selections and readable URL slugs.
//!
//! A slug reads as a sentence, for example
//! `women-owned-business-farmers-markets-that-accept-cash-are-in-austin-tx`.
//! The diversity fragment comes first, then the base phrase, then `that` and
//! one clause per remaining category in [`Category`] order. Decoding splits
//! the slug on the grammar's connective phrases and looks each remaining
//! fragment up in the catalog's reverse tables; whatever matches nothing is
//! taken as location text. Decoding never fails.

use std::{fmt, sync::Arc};

use log::debug;
use thiserror::Error;

use crate::{Category, FacetCatalog, FacetError, FacetSelection};

/// Slug used for the empty selection.
pub const DEFAULT_SLUG: &str = "facility-listings";

/// Canonical slug produced by [`SlugCodec::encode`].
///
/// Slugs are lowercase, hyphen-joined and never contain commas or empty
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Borrow the slug text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the slug of the empty selection.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SLUG
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

/// Convert display text into a slug fragment.
///
/// Letters are lowercased; commas, quotes, parentheses, periods and other
/// punctuation are dropped; whitespace, `/`, `-` and `_` become single
/// hyphens. `+` is kept so `LGBTQIA+` survives.
///
/// # Examples
///
/// ```
/// use marketfinder_core::slugify;
///
/// assert_eq!(slugify("Organic (USDA Certified)"), "organic-usda-certified");
/// assert_eq!(slugify("Austin, TX"), "austin-tx");
/// assert_eq!(slugify("LGBTQIA+ Owned Business"), "lgbtqia+-owned-business");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for character in text.chars() {
        if character.is_alphanumeric() || character == '+' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(character.to_lowercase());
        } else if character.is_whitespace() || matches!(character, '/' | '-' | '_') {
            pending_separator = true;
        }
    }
    slug
}

/// Connective phrases and fixed slugs shaping the sentence.
///
/// All phrases are hyphen-joined lowercase slugs. The defaults produce
/// `farmers-markets-that-have-<production>-products-accept-<payment>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugGrammar {
    /// Slug of the empty selection.
    pub default_slug: String,
    /// Phrase naming the listings, preceded by the diversity fragment.
    pub base_phrase: String,
    /// Word introducing the clauses after the base phrase.
    pub lead: String,
    /// Production clause as `(prefix, suffix)`.
    pub production: (String, String),
    /// Prefix of the payments clause.
    pub payments: String,
    /// Prefix of the assistance-program clause.
    pub fnap: String,
    /// Prefix of the location clause.
    pub location: String,
}

impl Default for SlugGrammar {
    fn default() -> Self {
        Self {
            default_slug: DEFAULT_SLUG.to_owned(),
            base_phrase: "farmers-markets".to_owned(),
            lead: "that".to_owned(),
            production: ("have".to_owned(), "products".to_owned()),
            payments: "accept".to_owned(),
            fnap: "accept".to_owned(),
            location: "are-in".to_owned(),
        }
    }
}

impl SlugGrammar {
    fn phrases(&self) -> [(&'static str, &str); 7] {
        [
            ("base_phrase", self.base_phrase.as_str()),
            ("lead", self.lead.as_str()),
            ("production prefix", self.production.0.as_str()),
            ("production suffix", self.production.1.as_str()),
            ("payments", self.payments.as_str()),
            ("fnap", self.fnap.as_str()),
            ("location", self.location.as_str()),
        ]
    }

    fn clause(&self, category: Category) -> Option<(&str, Option<&str>)> {
        match category {
            Category::Diversity => None,
            Category::Production => Some((
                self.production.0.as_str(),
                Some(self.production.1.as_str()),
            )),
            Category::Payments => Some((self.payments.as_str(), None)),
            Category::Fnap => Some((self.fnap.as_str(), None)),
            Category::Location => Some((self.location.as_str(), None)),
        }
    }

    /// Connective phrases split into tokens, longest first, without repeats.
    fn connectives(&self) -> Vec<Vec<String>> {
        let mut connectives: Vec<Vec<String>> = Vec::new();
        for (_, phrase) in self.phrases() {
            let tokens: Vec<String> = tokens(phrase).map(str::to_owned).collect();
            if !connectives.contains(&tokens) {
                connectives.push(tokens);
            }
        }
        connectives.sort_by_key(|tokens| std::cmp::Reverse(tokens.len()));
        connectives
    }
}

/// Errors raised when a grammar cannot round-trip a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugGrammarError {
    /// A grammar phrase is empty or not already in slug form.
    #[error("grammar {field} `{phrase}` must be a non-empty lowercase slug")]
    InvalidPhrase {
        /// Grammar field holding the phrase.
        field: &'static str,
        /// Rejected phrase.
        phrase: String,
    },
    /// A catalog fragment contains a connective phrase and would be split.
    #[error("{category} code `{code}` has fragment `{fragment}` containing connective `{phrase}`")]
    ConnectiveInFragment {
        /// Category of the offending entry.
        category: Category,
        /// Offending code.
        code: String,
        /// Fragment containing the phrase.
        fragment: String,
        /// Connective phrase found in the fragment.
        phrase: String,
    },
}

/// Encodes selections into slugs and decodes slugs back into selections.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use marketfinder_core::{Category, FacetCatalog, FacetSelection, SlugCodec, SlugGrammar};
///
/// let codec = SlugCodec::new(Arc::new(FacetCatalog::farmers_markets()), SlugGrammar::default())
///     .expect("built-in catalog fits the default grammar");
/// let selection = FacetSelection::new().with(Category::Production, "specialproductionmethods_6");
/// let slug = codec.encode(&selection).expect("known code");
/// assert_eq!(slug.as_str(), "farmers-markets-that-have-non-gmo-products");
/// assert_eq!(codec.decode(slug.as_str()), selection);
/// ```
#[derive(Debug, Clone)]
pub struct SlugCodec {
    catalog: Arc<FacetCatalog>,
    grammar: SlugGrammar,
    connectives: Vec<Vec<String>>,
    precedence: Vec<Category>,
}

impl SlugCodec {
    /// Build a codec, checking that every catalog fragment survives decoding.
    pub fn new(catalog: Arc<FacetCatalog>, grammar: SlugGrammar) -> Result<Self, SlugGrammarError> {
        let fixed = [("default_slug", grammar.default_slug.as_str())];
        for (field, phrase) in fixed.into_iter().chain(grammar.phrases()) {
            if phrase.is_empty() || slugify(phrase) != phrase {
                return Err(SlugGrammarError::InvalidPhrase {
                    field,
                    phrase: phrase.to_owned(),
                });
            }
        }
        let connectives = grammar.connectives();
        check_fragments(&catalog, &connectives)?;
        Ok(Self {
            catalog,
            grammar,
            connectives,
            precedence: Category::CODED.to_vec(),
        })
    }

    /// Change which category claims a fragment that several could decode to.
    ///
    /// Listed coded categories are tried first, in the given order; the rest
    /// follow in catalog order.
    #[must_use]
    pub fn with_precedence(mut self, order: &[Category]) -> Self {
        let mut precedence: Vec<Category> = Vec::with_capacity(Category::CODED.len());
        for category in order.iter().chain(Category::CODED.iter()) {
            if category.is_coded() && !precedence.contains(category) {
                precedence.push(*category);
            }
        }
        self.precedence = precedence;
        self
    }

    /// Catalog used for lookups.
    #[must_use]
    pub fn catalog(&self) -> &Arc<FacetCatalog> {
        &self.catalog
    }

    /// Grammar used to shape slugs.
    #[must_use]
    pub const fn grammar(&self) -> &SlugGrammar {
        &self.grammar
    }

    /// Encode a selection as its canonical slug.
    ///
    /// Fails with [`FacetError::UnknownCode`] when a coded category holds a
    /// code the catalog does not know.
    pub fn encode(&self, selection: &FacetSelection) -> Result<Slug, FacetError> {
        let diversity = selection
            .get(Category::Diversity)
            .map(|code| self.fragment(Category::Diversity, code))
            .transpose()?;
        let mut clauses = Vec::new();
        for (category, value) in selection.iter() {
            let Some((prefix, suffix)) = self.grammar.clause(category) else {
                continue;
            };
            let fragment = if category.is_coded() {
                self.fragment(category, value)?
            } else {
                slugify(value)
            };
            if fragment.is_empty() {
                continue;
            }
            clauses.push(prefix.to_owned());
            clauses.push(fragment);
            if let Some(suffix) = suffix {
                clauses.push(suffix.to_owned());
            }
        }

        if diversity.is_none() && clauses.is_empty() {
            return Ok(Slug(self.grammar.default_slug.clone()));
        }
        let mut parts: Vec<String> = diversity.into_iter().collect();
        parts.push(self.grammar.base_phrase.clone());
        if !clauses.is_empty() {
            parts.push(self.grammar.lead.clone());
            parts.extend(clauses);
        }
        Ok(Slug(parts.join("-").to_lowercase()))
    }

    /// Decode a slug into the selection it describes.
    ///
    /// Each fragment between connectives is claimed by the first category,
    /// in precedence order, whose reverse table holds it. A category keeps
    /// the first fragment it claims. Unmatched fragments become location
    /// text with hyphens turned into spaces.
    #[must_use]
    pub fn decode(&self, slug: &str) -> FacetSelection {
        let normalized = slug.trim().trim_matches('/').to_lowercase();
        let mut selection = FacetSelection::new();
        if normalized.is_empty() || normalized == self.grammar.default_slug {
            return selection;
        }
        let tokens: Vec<&str> = tokens(&normalized).collect();
        for fragment in self.fragments(&tokens) {
            self.assign(&mut selection, &fragment);
        }
        selection
    }

    fn fragment(&self, category: Category, code: &str) -> Result<String, FacetError> {
        self.catalog
            .entry(category, code)
            .map(|entry| entry.fragment().to_owned())
    }

    fn fragments(&self, tokens: &[&str]) -> Vec<String> {
        let mut fragments = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut rest = tokens;
        while let Some((first, tail)) = rest.split_first() {
            match self.connective_at(rest) {
                Some(length) => {
                    if !current.is_empty() {
                        fragments.push(current.join("-"));
                        current.clear();
                    }
                    rest = rest.get(length..).unwrap_or_default();
                }
                None => {
                    current.push(*first);
                    rest = tail;
                }
            }
        }
        if !current.is_empty() {
            fragments.push(current.join("-"));
        }
        fragments
    }

    fn connective_at(&self, tokens: &[&str]) -> Option<usize> {
        self.connectives
            .iter()
            .find(|phrase| starts_with_phrase(tokens, phrase))
            .map(Vec::len)
    }

    fn assign(&self, selection: &mut FacetSelection, fragment: &str) {
        let claimed = self.precedence.iter().find_map(|category| {
            self.catalog
                .code_for_slug_fragment(*category, fragment)
                .map(|code| (*category, code))
        });
        let (category, value) = match claimed {
            Some((category, code)) => (category, code.to_owned()),
            None => (Category::Location, fragment.replace('-', " ")),
        };
        if !selection.insert_if_absent(category, value) {
            debug!("dropping slug fragment `{fragment}`: {category} is already selected");
        }
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|character: char| character == '-' || character.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn starts_with_phrase(tokens: &[&str], phrase: &[String]) -> bool {
    !phrase.is_empty()
        && phrase.len() <= tokens.len()
        && phrase.iter().zip(tokens).all(|(word, token)| word == token)
}

fn check_fragments(
    catalog: &FacetCatalog,
    connectives: &[Vec<String>],
) -> Result<(), SlugGrammarError> {
    for facet in catalog.categories() {
        for (fragment, code) in facet.fragments() {
            let fragment_tokens: Vec<&str> = tokens(fragment).collect();
            let found = connectives.iter().find(|phrase| {
                (0..fragment_tokens.len()).any(|start| {
                    fragment_tokens
                        .get(start..)
                        .is_some_and(|window| starts_with_phrase(window, phrase))
                })
            });
            if let Some(phrase) = found {
                return Err(SlugGrammarError::ConnectiveInFragment {
                    category: facet.category(),
                    code: code.to_owned(),
                    fragment: fragment.to_owned(),
                    phrase: phrase.join("-"),
                });
            }
        }
    }
    Ok(())
}
