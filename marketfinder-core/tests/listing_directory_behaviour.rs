//! Behavioural tests for describing listings using rstest-bdd.

use std::{cell::RefCell, sync::Arc};

use marketfinder_core::{
    DescribeOutcome, DirectoryError, FacetCatalog, Listing, ListingDirectory, ListingProfile,
    test_support::{FailingStore, MemoryStore},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Default)]
struct DescribeWorld {
    directory: RefCell<Option<ListingDirectory<MemoryStore>>>,
    failing: RefCell<Option<ListingDirectory<FailingStore>>>,
    outcome: RefCell<Option<Result<DescribeOutcome, DirectoryError>>>,
}

#[fixture]
fn world() -> DescribeWorld {
    DescribeWorld::default()
}

fn catalog() -> Arc<FacetCatalog> {
    Arc::new(FacetCatalog::farmers_markets())
}

#[given("a directory with a listing that accepts SNAP")]
fn given_directory(world: &DescribeWorld) {
    let store = MemoryStore::with_listing(
        Listing::new(1, "Riverside Market")
            .with_address("1 River Rd, Austin, TX")
            .with_flag("FNAP_2")
            .with_profile(ListingProfile {
                fnap: Some("SNAP".to_owned()),
                ..ListingProfile::default()
            }),
    );
    let directory = ListingDirectory::new(store, catalog()).expect("directory");
    world.directory.replace(Some(directory));
}

#[given("a directory whose store is unavailable")]
fn given_failing_directory(world: &DescribeWorld) {
    let directory = ListingDirectory::new(FailingStore, catalog()).expect("directory");
    world.failing.replace(Some(directory));
}

#[when("I describe listing 1")]
fn describe_known(world: &DescribeWorld) {
    let outcome = world
        .directory
        .borrow()
        .as_ref()
        .expect("directory should be initialised")
        .describe(1);
    world.outcome.replace(Some(outcome));
}

#[when("I describe listing 404")]
fn describe_unknown(world: &DescribeWorld) {
    let outcome = world
        .directory
        .borrow()
        .as_ref()
        .expect("directory should be initialised")
        .describe(404);
    world.outcome.replace(Some(outcome));
}

#[when("I describe a listing through the failing directory")]
fn describe_failing(world: &DescribeWorld) {
    let outcome = world
        .failing
        .borrow()
        .as_ref()
        .expect("failing directory should be initialised")
        .describe(1);
    world.outcome.replace(Some(outcome));
}

#[then("the description includes an overview and FAQ")]
fn then_described(world: &DescribeWorld) {
    let outcome = world.outcome.borrow();
    let Some(Ok(DescribeOutcome::Found(detail))) = outcome.as_ref() else {
        panic!("expected a description");
    };
    assert_eq!(detail.listing_name, "Riverside Market");
    assert_eq!(detail.content_pages.len(), 1);
    assert_eq!(detail.faq.faq_body.len(), 1);
    assert_eq!(
        detail.similar_query.title.seo_slug.as_str(),
        "farmers-markets-that-accept-snap"
    );
}

#[then("the listing is reported as not found")]
fn then_not_found(world: &DescribeWorld) {
    let outcome = world.outcome.borrow();
    let Some(Ok(DescribeOutcome::NotFound(not_found))) = outcome.as_ref() else {
        panic!("expected a not-found outcome");
    };
    assert_eq!(not_found.listing_id, 404);
}

#[then("a storage error is reported")]
fn then_storage_error(world: &DescribeWorld) {
    let outcome = world.outcome.borrow();
    assert!(matches!(
        outcome.as_ref(),
        Some(Err(DirectoryError::Storage(_)))
    ));
}

#[scenario(path = "tests/features/listing_directory.feature", index = 0)]
fn known_listing(world: DescribeWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/listing_directory.feature", index = 1)]
fn unknown_listing(world: DescribeWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/listing_directory.feature", index = 2)]
fn storage_failure(world: DescribeWorld) {
    let _ = world;
}
