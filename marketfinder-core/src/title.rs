//! Title-casing of slugs for page titles.

use std::collections::BTreeSet;

use crate::{Category, FacetSelection};

/// Words left in lowercase when a slug becomes a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleStyle {
    stop_words: BTreeSet<String>,
    diversity_stop_words: BTreeSet<String>,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self::new(
            ["that", "have", "products", "accept", "are", "in"],
            ["farmers", "markets"],
        )
    }
}

impl TitleStyle {
    /// Build a style from the always-lowercase words and the extra words
    /// lowercased when a diversity value leads the title.
    pub fn new<I, J, S, T>(stop_words: I, diversity_stop_words: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
            diversity_stop_words: diversity_stop_words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }

    fn keeps_lowercase(&self, word: &str, diversity: bool) -> bool {
        self.stop_words.contains(word) || (diversity && self.diversity_stop_words.contains(word))
    }
}

/// Formats slugs as titles.
///
/// # Examples
///
/// ```
/// use marketfinder_core::{Category, FacetSelection, TitleFormatter};
///
/// let titles = TitleFormatter::default();
/// let selection = FacetSelection::new().with(Category::Production, "specialproductionmethods_6");
/// assert_eq!(
///     titles.title_for("farmers-markets-that-have-non-gmo-products", &selection),
///     "Farmers Markets that have Non Gmo products",
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFormatter {
    style: TitleStyle,
}

impl TitleFormatter {
    /// Create a formatter using the given style.
    #[must_use]
    pub const fn new(style: TitleStyle) -> Self {
        Self { style }
    }

    /// Title for a slug.
    ///
    /// Hyphen-separated words are capitalised unless they are stop words.
    /// When the selection carries a diversity value the diversity stop words
    /// stay lowercase too.
    #[must_use]
    pub fn title_for(&self, slug: &str, selection: &FacetSelection) -> String {
        let diversity = selection.get(Category::Diversity).is_some();
        slug.split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let word = word.to_lowercase();
                if self.style.keeps_lowercase(&word, diversity) {
                    word
                } else {
                    capitalise(&word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalise(word: &str) -> String {
    let mut characters = word.chars();
    characters.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(characters).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "farmers-markets-that-have-non-gmo-products",
        FacetSelection::new(),
        "Farmers Markets that have Non Gmo products"
    )]
    #[case(
        "women-owned-business-farmers-markets-that-accept-cash",
        FacetSelection::new().with(Category::Diversity, "diversegroup_3"),
        "Women Owned Business farmers markets that accept Cash"
    )]
    #[case(
        "farmers-markets-that-are-in-austin-tx",
        FacetSelection::new().with(Category::Location, "Austin, TX"),
        "Farmers Markets that are in Austin Tx"
    )]
    #[case("facility-listings", FacetSelection::new(), "Facility Listings")]
    #[case("", FacetSelection::new(), "")]
    fn formats_default_style(
        #[case] slug: &str,
        #[case] selection: FacetSelection,
        #[case] expected: &str,
    ) {
        assert_eq!(TitleFormatter::default().title_for(slug, &selection), expected);
    }

    #[rstest]
    fn custom_style_replaces_stop_words() {
        let titles = TitleFormatter::new(TitleStyle::new(["and"], ["stalls"]));
        let selection = FacetSelection::new().with(Category::Diversity, "diversegroup_1");
        assert_eq!(
            titles.title_for("fruit-and-veg-stalls-that-open", &selection),
            "Fruit and Veg stalls That Open"
        );
    }
}
