//! Property-based tests for the slug codec.
//!
//! # Invariants tested
//!
//! - **Round-trip:** decoding the slug of a selection built from catalog codes
//!   yields that selection.
//! - **Idempotence:** re-encoding a decoded slug reproduces the slug.
//! - **Totality:** any slug decodes to a selection that encodes successfully.

use std::sync::Arc;

use marketfinder_core::{Category, FacetCatalog, FacetSelection, SlugCodec, SlugGrammar};
use proptest::prelude::*;

fn catalog() -> Arc<FacetCatalog> {
    Arc::new(FacetCatalog::farmers_markets())
}

fn codec() -> SlugCodec {
    SlugCodec::new(catalog(), SlugGrammar::default()).expect("built-in catalog fits grammar")
}

fn coded_value(category: Category) -> impl Strategy<Value = Option<String>> {
    let codes: Vec<String> = catalog()
        .category(category)
        .map(|facet| {
            facet
                .entries()
                .iter()
                .map(|entry| entry.code().to_owned())
                .collect()
        })
        .unwrap_or_default();
    prop::option::of(prop::sample::select(codes))
}

fn location_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "austin tx".to_owned(),
        "portland or".to_owned(),
        "des moines ia".to_owned(),
        "burlington vt".to_owned(),
        "boise".to_owned(),
    ]))
}

fn selection_strategy() -> impl Strategy<Value = FacetSelection> {
    (
        coded_value(Category::Diversity),
        coded_value(Category::Production),
        coded_value(Category::Payments),
        coded_value(Category::Fnap),
        location_value(),
    )
        .prop_map(|(diversity, production, payments, fnap, location)| {
            [
                (Category::Diversity, diversity),
                (Category::Production, production),
                (Category::Payments, payments),
                (Category::Fnap, fnap),
                (Category::Location, location),
            ]
            .into_iter()
            .filter_map(|(category, value)| value.map(|value| (category, value)))
            .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a selection survives encoding and decoding unchanged.
    #[test]
    fn decode_inverts_encode(selection in selection_strategy()) {
        let codec = codec();
        let slug = codec.encode(&selection).expect("catalog codes encode");
        prop_assert_eq!(codec.decode(slug.as_str()), selection);
    }

    /// Property: a canonical slug is a fixed point of decode then encode.
    #[test]
    fn encode_is_idempotent(selection in selection_strategy()) {
        let codec = codec();
        let slug = codec.encode(&selection).expect("catalog codes encode");
        let again = codec
            .encode(&codec.decode(slug.as_str()))
            .expect("decoded selection encodes");
        prop_assert_eq!(again, slug);
    }

    /// Property: the empty selection and only the empty selection maps to the
    /// default slug.
    #[test]
    fn default_slug_means_empty_selection(selection in selection_strategy()) {
        let codec = codec();
        let slug = codec.encode(&selection).expect("catalog codes encode");
        prop_assert_eq!(slug.is_default(), selection.is_empty());
    }

    /// Property: decoding never fails and never invents unknown codes.
    #[test]
    fn arbitrary_slugs_decode_to_encodable_selections(input in "[a-z0-9+/ -]{0,48}") {
        let codec = codec();
        let selection = codec.decode(&input);
        prop_assert!(codec.encode(&selection).is_ok());
    }
}
