//! Caller-facing listing operations.
//!
//! [`ListingDirectory`] wires the slug codec, predicate builder and title
//! formatter to a [`ListingStore`]. Store failures surface as
//! [`DirectoryError::Storage`]; an empty match set is an ordinary `Ok`.

use std::{error::Error as StdError, sync::Arc};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Category, FacetCatalog, FacetError, FacetSelection, GeoError, GeoPoint, Listing,
    ListingStore, ListingSummary, QueryPredicateBuilder, Radius, RadiusHit, Slug, SlugCodec,
    SlugGrammar, SlugGrammarError, TitleFormatter,
    content::{self, ContentPage, Faq},
    within_radius,
};

const RANDOM_LISTINGS: usize = 3;
const SIMILAR_LISTINGS: usize = 5;

/// Errors raised by [`ListingDirectory`] operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A selection referenced a code the catalog does not know.
    #[error(transparent)]
    Facet(#[from] FacetError),
    /// Coordinates or radius were malformed or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] GeoError),
    /// The listing store failed.
    #[error("listing store failed")]
    Storage(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl DirectoryError {
    fn storage<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Storage(Box::new(source))
    }
}

/// Input to [`ListingDirectory::resolve`]: a selection or a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolveRequest {
    /// Structured selection.
    Selection {
        /// Chosen value per category.
        filter_params: FacetSelection,
    },
    /// Readable slug; the empty string means no selection.
    Slug {
        /// Slug text as received.
        slug_input: String,
    },
}

/// Selection echoed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Chosen value per category.
    pub filter_params: FacetSelection,
}

/// Canonical slug with its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoTitle {
    /// Canonical slug for the selection.
    pub seo_slug: Slug,
    /// Human-readable title.
    pub seo_title: String,
}

/// Result of [`ListingDirectory::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Matching listings in identifier order.
    pub markets: Vec<ListingSummary>,
    /// Selection that was applied.
    pub query_params: QueryParams,
    /// Canonical slug and title.
    pub title: SeoTitle,
}

/// One selectable value within a filter group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterParam {
    /// Value to send back in a selection.
    pub param_key: String,
    /// Display label.
    pub param_value: String,
}

/// All values selectable for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    /// Category identifier.
    pub filter_key: Category,
    /// Display title.
    pub filter_title: String,
    /// Selectable values.
    pub filter_params: Vec<FilterParam>,
}

/// Result of [`ListingDirectory::filters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// One group per category, in catalog order.
    pub filter_options: Vec<FilterGroup>,
}

/// Selection derived from a listing, with its slug and other matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarQuery {
    /// Derived selection.
    pub query_params: QueryParams,
    /// Canonical slug and title for the derived selection.
    pub title: SeoTitle,
    /// Other listings matching the derived selection.
    pub markets: Vec<ListingSummary>,
}

/// Full description of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingDetail {
    /// Overview page.
    pub content_pages: Vec<ContentPage>,
    /// Frequently asked questions.
    pub faq: Faq,
    /// Postal address.
    pub listing_location: Option<String>,
    /// Store identifier.
    pub listing_id: u64,
    /// Display name.
    pub listing_name: String,
    /// Randomly sampled listings.
    pub random_markets: Vec<ListingSummary>,
    /// Listings like this one.
    pub similar_query: SimilarQuery,
}

/// Reported when no listing has the requested identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    /// Identifier that was requested.
    pub listing_id: u64,
    /// Human-readable message.
    pub error: String,
}

/// Result of [`ListingDirectory::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DescribeOutcome {
    /// The listing exists.
    Found(Box<ListingDetail>),
    /// No listing has the identifier.
    NotFound(NotFound),
}

/// Listing discovery over a store.
#[derive(Debug)]
pub struct ListingDirectory<S> {
    codec: SlugCodec,
    predicates: QueryPredicateBuilder,
    titles: TitleFormatter,
    store: S,
}

impl<S: ListingStore> ListingDirectory<S> {
    /// Build a directory with the default slug grammar and title style.
    pub fn new(store: S, catalog: Arc<FacetCatalog>) -> Result<Self, SlugGrammarError> {
        let codec = SlugCodec::new(catalog, SlugGrammar::default())?;
        Ok(Self::with_parts(store, codec, TitleFormatter::default()))
    }

    /// Build a directory from a configured codec and formatter.
    pub fn with_parts(store: S, codec: SlugCodec, titles: TitleFormatter) -> Self {
        let predicates = QueryPredicateBuilder::new(Arc::clone(codec.catalog()));
        Self {
            codec,
            predicates,
            titles,
            store,
        }
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The slug codec.
    pub const fn codec(&self) -> &SlugCodec {
        &self.codec
    }

    /// Every selectable value, grouped by category.
    pub fn filters(&self) -> Result<FilterOptions, DirectoryError> {
        let mut filter_options = Vec::with_capacity(Category::ALL.len());
        for facet in self.codec.catalog().categories() {
            let filter_params = if facet.category().is_coded() {
                facet
                    .entries()
                    .iter()
                    .map(|entry| FilterParam {
                        param_key: entry.code().to_owned(),
                        param_value: entry.label().to_owned(),
                    })
                    .collect()
            } else {
                self.store
                    .distinct_addresses()
                    .map_err(DirectoryError::storage)?
                    .into_iter()
                    .map(|address| FilterParam {
                        param_key: address.clone(),
                        param_value: address,
                    })
                    .collect()
            };
            filter_options.push(FilterGroup {
                filter_key: facet.category(),
                filter_title: facet.title().to_owned(),
                filter_params,
            });
        }
        Ok(FilterOptions { filter_options })
    }

    /// Matching listings for a selection or slug, with the canonical slug.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, DirectoryError> {
        let selection = match request {
            ResolveRequest::Selection { filter_params } => filter_params.clone(),
            ResolveRequest::Slug { slug_input } => self.codec.decode(slug_input),
        };
        let title = self.seo_title(&selection)?;
        let markets = self
            .matching(&selection)?
            .iter()
            .map(Listing::summary)
            .collect();
        Ok(Resolution {
            markets,
            query_params: QueryParams {
                filter_params: selection,
            },
            title,
        })
    }

    /// Listings within the radius of `center`, in identifier order.
    pub fn find_within_radius(
        &self,
        center: GeoPoint,
        radius: Radius,
    ) -> Result<Vec<RadiusHit>, DirectoryError> {
        let listings = self.store.all().map_err(DirectoryError::storage)?;
        let hits = within_radius(center, radius.as_km(), &listings)?
            .into_iter()
            .filter_map(|listing| {
                listing
                    .location
                    .map(|location| RadiusHit::from_listing(listing, location))
            })
            .collect::<Vec<_>>();
        debug!(
            "{} of {} listings within {} km",
            hits.len(),
            listings.len(),
            radius.as_km()
        );
        Ok(hits)
    }

    /// Full description of a listing, or [`DescribeOutcome::NotFound`].
    pub fn describe(&self, listing_id: u64) -> Result<DescribeOutcome, DirectoryError> {
        let Some(listing) = self
            .store
            .get(listing_id)
            .map_err(DirectoryError::storage)?
        else {
            return Ok(DescribeOutcome::NotFound(NotFound {
                listing_id,
                error: format!("no listing with id {listing_id}"),
            }));
        };

        let similar_selection = self.similar_selection(&listing);
        let similar_title = self.seo_title(&similar_selection)?;
        let similar_markets = self
            .matching(&similar_selection)?
            .iter()
            .filter(|candidate| candidate.id != listing.id)
            .take(SIMILAR_LISTINGS)
            .map(Listing::summary)
            .collect();

        Ok(DescribeOutcome::Found(Box::new(ListingDetail {
            content_pages: vec![content::overview(&listing)],
            faq: content::faq(&listing),
            listing_location: listing.address.clone(),
            listing_id: listing.id,
            listing_name: listing.name.clone(),
            random_markets: self.random_listings(RANDOM_LISTINGS)?,
            similar_query: SimilarQuery {
                query_params: QueryParams {
                    filter_params: similar_selection,
                },
                title: similar_title,
                markets: similar_markets,
            },
        })))
    }

    /// Up to `count` randomly sampled listings.
    pub fn random_listings(&self, count: usize) -> Result<Vec<ListingSummary>, DirectoryError> {
        let sampled = self.store.sample(count).map_err(DirectoryError::storage)?;
        Ok(sampled.iter().map(Listing::summary).collect())
    }

    fn matching(&self, selection: &FacetSelection) -> Result<Vec<Listing>, DirectoryError> {
        let predicate = self.predicates.build(selection)?;
        self.store.find(&predicate).map_err(DirectoryError::storage)
    }

    fn seo_title(&self, selection: &FacetSelection) -> Result<SeoTitle, DirectoryError> {
        let seo_slug = self.codec.encode(selection)?;
        let seo_title = self.titles.title_for(seo_slug.as_str(), selection);
        Ok(SeoTitle {
            seo_slug,
            seo_title,
        })
    }

    fn similar_selection(&self, listing: &Listing) -> FacetSelection {
        let catalog = self.codec.catalog();
        let mut selection = FacetSelection::new();
        for category in Category::CODED {
            let flagged = catalog.category(category).and_then(|facet| {
                facet
                    .entries()
                    .iter()
                    .map(|entry| entry.code())
                    .find(|code| listing.has_flag(code))
            });
            let code = flagged.or_else(|| {
                listing
                    .profile
                    .facet_text(category)
                    .and_then(|text| catalog.code_for_label_fragment(category, text))
            });
            match code {
                Some(code) => {
                    selection.insert(category, code);
                }
                None => debug!("listing {} has no {category} value", listing.id),
            }
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DistanceUnit, ListingProfile,
        test_support::{FailingStore, MemoryStore},
    };
    use rstest::{fixture, rstest};

    fn catalog() -> Arc<FacetCatalog> {
        Arc::new(FacetCatalog::farmers_markets())
    }

    #[fixture]
    fn directory() -> ListingDirectory<MemoryStore> {
        let store = MemoryStore::with_listings([
            Listing::new(1, "Downtown Market")
                .with_address("123 Main St, Austin, TX")
                .with_location(GeoPoint { x: 30.28, y: -97.75 })
                .with_flag("specialproductionmethods_6")
                .with_flag("acceptedpayment_3")
                .with_profile(ListingProfile {
                    fnap: Some("SNAP;WIC".to_owned()),
                    ..ListingProfile::default()
                }),
            Listing::new(2, "Eastside Market")
                .with_address("5 Oak St, Austin, TX")
                .with_location(GeoPoint { x: 30.26, y: -97.71 })
                .with_flag("specialproductionmethods_6")
                .with_flag("acceptedpayment_3"),
            Listing::new(3, "Dallas Farmers Market")
                .with_address("1 Elm St, Dallas, TX")
                .with_location(GeoPoint { x: 32.78, y: -96.80 })
                .with_flag("acceptedpayment_3"),
        ]);
        ListingDirectory::new(store, catalog()).expect("built-in catalog fits default grammar")
    }

    #[rstest]
    fn filters_list_catalog_groups_and_cities(directory: ListingDirectory<MemoryStore>) {
        let options = directory.filters().expect("filters");
        let keys: Vec<_> = options
            .filter_options
            .iter()
            .map(|group| group.filter_key)
            .collect();
        assert_eq!(keys, Category::ALL.to_vec());
        let cities = options.filter_options.last().expect("city group");
        assert_eq!(cities.filter_title, "Cities");
        assert_eq!(cities.filter_params.len(), 3);
        assert_eq!(cities.filter_params[0].param_key, "1 elm st, dallas, tx");
        let payments = &options.filter_options[2];
        assert_eq!(payments.filter_params[2].param_key, "acceptedpayment_3");
        assert_eq!(payments.filter_params[2].param_value, "Cash");
    }

    #[rstest]
    fn resolve_selection_returns_matches_and_slug(directory: ListingDirectory<MemoryStore>) {
        let request = ResolveRequest::Selection {
            filter_params: FacetSelection::new()
                .with(Category::Production, "specialproductionmethods_6"),
        };
        let resolution = directory.resolve(&request).expect("resolve");
        let ids: Vec<_> = resolution.markets.iter().map(|m| m.listing_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            resolution.title.seo_slug.as_str(),
            "farmers-markets-that-have-non-gmo-products"
        );
        assert_eq!(
            resolution.title.seo_title,
            "Farmers Markets that have Non Gmo products"
        );
    }

    #[rstest]
    fn resolve_slug_canonicalises_input(directory: ListingDirectory<MemoryStore>) {
        let request = ResolveRequest::Slug {
            slug_input: "/Farmers-Markets-That-Are-In-Austin-TX/".to_owned(),
        };
        let resolution = directory.resolve(&request).expect("resolve");
        assert_eq!(
            resolution.title.seo_slug.as_str(),
            "farmers-markets-that-are-in-austin-tx"
        );
        assert_eq!(
            resolution.query_params.filter_params.get(Category::Location),
            Some("austin tx")
        );
        assert_eq!(resolution.markets.len(), 2);
    }

    #[rstest]
    fn empty_slug_is_the_empty_selection(directory: ListingDirectory<MemoryStore>) {
        let request = ResolveRequest::Slug {
            slug_input: String::new(),
        };
        let resolution = directory.resolve(&request).expect("resolve");
        assert!(resolution.query_params.filter_params.is_empty());
        assert!(resolution.title.seo_slug.is_default());
        assert_eq!(resolution.markets.len(), 3);
    }

    #[rstest]
    fn resolve_rejects_unknown_codes(directory: ListingDirectory<MemoryStore>) {
        let request = ResolveRequest::Selection {
            filter_params: FacetSelection::new().with(Category::Payments, "acceptedpayment_99"),
        };
        let err = directory.resolve(&request).expect_err("unknown code");
        assert!(matches!(err, DirectoryError::Facet(FacetError::UnknownCode { .. })));
    }

    #[rstest]
    fn radius_search_reports_hits_with_coordinates(directory: ListingDirectory<MemoryStore>) {
        let center = GeoPoint::new(30.27, -97.74).expect("valid point");
        let radius = Radius::new(5.0, DistanceUnit::Miles).expect("valid radius");
        let hits = directory.find_within_radius(center, radius).expect("search");
        let ids: Vec<_> = hits.iter().map(|hit| hit.listing_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!((hits[0].location_x - 30.28).abs() < f64::EPSILON);
    }

    #[rstest]
    fn describe_unknown_listing_is_not_found(directory: ListingDirectory<MemoryStore>) {
        let outcome = directory.describe(404).expect("describe");
        assert!(matches!(
            outcome,
            DescribeOutcome::NotFound(NotFound { listing_id: 404, .. })
        ));
    }

    #[rstest]
    fn describe_derives_similar_selection(directory: ListingDirectory<MemoryStore>) {
        let DescribeOutcome::Found(detail) = directory.describe(1).expect("describe") else {
            panic!("listing 1 exists");
        };
        let selection = &detail.similar_query.query_params.filter_params;
        assert_eq!(selection.get(Category::Diversity), None);
        assert_eq!(
            selection.get(Category::Production),
            Some("specialproductionmethods_6")
        );
        assert_eq!(selection.get(Category::Payments), Some("acceptedpayment_3"));
        assert_eq!(selection.get(Category::Fnap), Some("FNAP_1"));
        assert!(detail.similar_query.markets.is_empty());
        assert_eq!(detail.random_markets.len(), 3);
        assert_eq!(detail.content_pages[0].title, "Overview");
    }

    #[rstest]
    fn similar_markets_exclude_the_listing_itself(directory: ListingDirectory<MemoryStore>) {
        let DescribeOutcome::Found(detail) = directory.describe(2).expect("describe") else {
            panic!("listing 2 exists");
        };
        let ids: Vec<_> = detail
            .similar_query
            .markets
            .iter()
            .map(|m| m.listing_id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    fn assert_storage<T: std::fmt::Debug>(result: Result<T, DirectoryError>) {
        let err = result.expect_err("store fails");
        assert!(matches!(err, DirectoryError::Storage(_)), "unexpected error: {err}");
    }

    #[rstest]
    fn store_failures_are_storage_errors() {
        let directory = ListingDirectory::new(FailingStore, catalog()).expect("directory");
        assert_storage(directory.filters());
        assert_storage(directory.resolve(&ResolveRequest::Slug {
            slug_input: String::new(),
        }));
        assert_storage(directory.describe(1));
        assert_storage(directory.random_listings(3));
        let center = GeoPoint::new(0.0, 0.0).expect("valid point");
        let radius = Radius::kilometres(1.0).expect("valid radius");
        assert_storage(directory.find_within_radius(center, radius));
    }
}
