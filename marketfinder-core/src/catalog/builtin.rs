//! Built-in farmers-market facet data.
//!
//! Codes name the boolean columns of the USDA local food directory export,
//! so they keep that export's spelling.

use super::{CatalogSpec, Category, CategorySpec, EntrySpec};

const DIVERSITY: &[(&str, &str)] = &[
    ("diversegroup_1", "Native American-Owned Business"),
    ("diversegroup_2", "Minority-Owned Business"),
    ("diversegroup_3", "Women-Owned Business"),
    ("diversegroup_4", "Veteran-Owned Business"),
    ("diversegroup_5", "LGBTQIA+ Owned Business"),
    ("diversegroup_6", "Disability-Owned Business"),
];

const PRODUCTION: &[(&str, &str)] = &[
    ("specialproductionmethods_1", "Organic (USDA Certified)"),
    (
        "specialproductionmethods_2",
        "Non-Certified, but Practicing Organic",
    ),
    ("specialproductionmethods_3", "Certified \"Naturally Grown\""),
    (
        "specialproductionmethods_4",
        "Good Agricultural Practices (GAP)-Certified",
    ),
    ("specialproductionmethods_5", "No antibiotics"),
    ("specialproductionmethods_6", "Non-GMO"),
    ("specialproductionmethods_7", "No hormones"),
    ("specialproductionmethods_8", "No pesticides"),
    ("specialproductionmethods_9", "Grass Fed"),
    ("specialproductionmethods_10", "Pasture-raised/free-range animals"),
    ("specialproductionmethods_11", "Humane treatment of animals"),
    (
        "specialproductionmethods_12",
        "Fair labor practices, living wage, fair trade, etc.",
    ),
    ("specialproductionmethods_13", "Kosher"),
    ("specialproductionmethods_14", "Halal"),
];

const PAYMENTS: &[(&str, &str)] = &[
    ("acceptedpayment_1", "Barter"),
    ("acceptedpayment_2", "Volunteer Work"),
    ("acceptedpayment_3", "Cash"),
    ("acceptedpayment_4", "Personal Checks"),
    ("acceptedpayment_5", "Commercial Checks/Accounts"),
    ("acceptedpayment_6", "Debit card/Credit card"),
];

const FNAP: &[(&str, &str)] = &[
    ("FNAP_1", "WIC"),
    ("FNAP_2", "SNAP"),
    ("FNAP_3", "Market Bucks"),
    ("FNAP_4", "WIC Farmers Market"),
    ("FNAP_5", "Senior Farmers Market Nutrition Program"),
    ("FNAP_888", "Other Food and Nutrition Assistance Programs"),
];

/// Slug fragments published before the current labels settled.
const ALIASES: &[(&str, &[&str])] = &[
    ("specialproductionmethods_3", &["naturally-grown"]),
    ("specialproductionmethods_4", &["gap-certified"]),
    (
        "specialproductionmethods_12",
        &["fair-labor-practices-living-wage-fair-trade"],
    ),
    ("acceptedpayment_5", &["commerical-checks-accounts"]),
    (
        "FNAP_888",
        &["other-food-nutrition-assistance-programs"],
    ),
];

pub(super) fn spec() -> CatalogSpec {
    CatalogSpec {
        categories: vec![
            coded(Category::Diversity, DIVERSITY),
            coded(Category::Production, PRODUCTION),
            coded(Category::Payments, PAYMENTS),
            coded(Category::Fnap, FNAP),
            CategorySpec {
                id: Category::Location,
                title: Category::Location.default_title().to_owned(),
                entries: Vec::new(),
            },
        ],
    }
}

fn coded(category: Category, entries: &[(&str, &str)]) -> CategorySpec {
    CategorySpec {
        id: category,
        title: category.default_title().to_owned(),
        entries: entries
            .iter()
            .map(|(code, label)| EntrySpec {
                code: (*code).to_owned(),
                label: (*label).to_owned(),
                aliases: aliases_for(code),
            })
            .collect(),
    }
}

fn aliases_for(code: &str) -> Vec<String> {
    ALIASES
        .iter()
        .filter(|(aliased, _)| *aliased == code)
        .flat_map(|(_, aliases)| aliases.iter().map(|alias| (*alias).to_owned()))
        .collect()
}
