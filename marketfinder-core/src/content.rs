//! Descriptive content generated from a listing's free-text fields.
//!
//! Everything here is a pure function of a [`Listing`]; absent fields simply
//! contribute nothing.

use serde::{Deserialize, Serialize};

use crate::Listing;

/// A titled page of listing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPage {
    /// Page heading.
    pub title: String,
    /// Prose summary assembled from the fields that are present.
    pub summary: String,
    /// Grouped facts in a fixed order.
    pub facts: Vec<Fact>,
}

/// A group of values taken from one `;`-separated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Group heading.
    pub title: String,
    /// Individual values; empty when the field is absent.
    pub content: Vec<String>,
}

/// Frequently asked questions about a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    /// Section heading naming the listing.
    pub faq_title: String,
    /// Questions with answers, in display order.
    pub faq_body: Vec<FaqEntry>,
}

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
}

/// Overview page: a summary paragraph and ten fact groups.
#[must_use]
pub fn overview(listing: &Listing) -> ContentPage {
    let profile = &listing.profile;
    let sentences = [
        listing
            .address
            .as_deref()
            .map(|text| format!("The market is located at {text}.")),
        profile
            .organization
            .as_deref()
            .map(|text| format!("It is organized by {text}.")),
        profile
            .diversity
            .as_deref()
            .map(|text| format!("The market is run by or includes {text}.")),
        profile
            .production
            .as_deref()
            .map(|text| format!("Vendors follow production practices such as {text}.")),
        profile
            .payments
            .as_deref()
            .map(|text| format!("Accepted forms of payment include {text}.")),
        profile
            .fnap
            .as_deref()
            .map(|text| format!("Shoppers can use assistance programs including {text}.")),
        profile.description.clone(),
        profile.location_description.clone(),
        profile
            .site
            .as_deref()
            .map(|text| format!("The market is held at {text}.")),
        profile
            .indoor
            .as_deref()
            .map(|text| format!("Indoor arrangements: {text}.")),
        profile
            .online_ordering
            .as_deref()
            .map(|text| format!("Online ordering is available through {text}.")),
    ];
    let summary = sentences
        .into_iter()
        .flatten()
        .filter(|sentence| !sentence.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let groups = [
        ("Organizations", &profile.organization),
        ("Diversity", &profile.diversity),
        ("Production/Practice Methods", &profile.production),
        ("Accepted Payments", &profile.payments),
        (
            "Accepted Food and Nutrition Assistance Programs",
            &profile.fnap,
        ),
        ("Listing Description", &profile.description),
        ("Location Description", &profile.location_description),
        ("Location Site", &profile.site),
        ("Indoor Market", &profile.indoor),
        ("Online Ordering", &profile.online_ordering),
    ];
    let facts = groups
        .into_iter()
        .map(|(title, field)| Fact {
            title: title.to_owned(),
            content: split_values(field.as_deref()),
        })
        .collect();

    ContentPage {
        title: "Overview".to_owned(),
        summary,
        facts,
    }
}

/// Up to six questions, one per present field.
#[must_use]
pub fn faq(listing: &Listing) -> Faq {
    let name = listing.name.as_str();
    let profile = &listing.profile;
    let entries = [
        profile.organization.as_deref().map(|text| FaqEntry {
            question: format!("Which organizations is {name} part of?"),
            answer: format!("{name} is part of {text}."),
        }),
        profile.diversity.as_deref().map(|text| FaqEntry {
            question: format!("Is {name} affiliated with any diversity groups?"),
            answer: format!("Yes, {name} is affiliated with {text}."),
        }),
        profile.production.as_deref().map(|text| FaqEntry {
            question: format!("What production methods are used at {name}?"),
            answer: format!("Vendors at {name} use methods such as {text}."),
        }),
        profile.online_ordering.as_deref().map(|_| FaqEntry {
            question: format!("Can I order online from {name}?"),
            answer: format!("Yes, {name} takes online orders."),
        }),
        profile.payments.as_deref().map(|text| FaqEntry {
            question: format!("Which payment methods does {name} accept?"),
            answer: format!("{name} accepts {text}."),
        }),
        profile.fnap.as_deref().map(|text| FaqEntry {
            question: format!(
                "Can I use food and nutrition assistance programs (FNAP) at {name}?"
            ),
            answer: format!("Yes, {name} accepts {text}."),
        }),
    ];

    Faq {
        faq_title: format!("Frequently Asked Questions about {name}"),
        faq_body: entries.into_iter().flatten().collect(),
    }
}

fn split_values(field: Option<&str>) -> Vec<String> {
    field.map_or_else(Vec::new, |text| {
        text.split(';').map(str::to_owned).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListingProfile;
    use rstest::{fixture, rstest};

    #[fixture]
    fn listing() -> Listing {
        Listing::new(11, "Riverside Market")
            .with_address("1 River Rd, Austin, TX")
            .with_profile(ListingProfile {
                payments: Some("Cash;Credit/debit cards".to_owned()),
                fnap: Some("SNAP".to_owned()),
                online_ordering: Some("https://example.org/order".to_owned()),
                ..ListingProfile::default()
            })
    }

    #[rstest]
    fn overview_has_ten_fact_groups_in_order(listing: Listing) {
        let page = overview(&listing);
        assert_eq!(page.title, "Overview");
        let titles: Vec<_> = page.facts.iter().map(|fact| fact.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Organizations",
                "Diversity",
                "Production/Practice Methods",
                "Accepted Payments",
                "Accepted Food and Nutrition Assistance Programs",
                "Listing Description",
                "Location Description",
                "Location Site",
                "Indoor Market",
                "Online Ordering",
            ]
        );
    }

    #[rstest]
    fn facts_split_on_semicolons(listing: Listing) {
        let page = overview(&listing);
        assert_eq!(
            page.facts[3].content,
            vec!["Cash".to_owned(), "Credit/debit cards".to_owned()]
        );
        assert!(page.facts[0].content.is_empty());
    }

    #[rstest]
    fn summary_mentions_only_present_fields(listing: Listing) {
        let page = overview(&listing);
        assert!(page.summary.starts_with("The market is located at 1 River Rd, Austin, TX."));
        assert!(page.summary.contains("SNAP"));
        assert!(!page.summary.contains("organized by"));
    }

    #[rstest]
    fn bare_listing_has_empty_summary() {
        let page = overview(&Listing::new(1, "Bare"));
        assert!(page.summary.is_empty());
        assert!(page.facts.iter().all(|fact| fact.content.is_empty()));
    }

    #[rstest]
    fn faq_follows_present_fields(listing: Listing) {
        let faq = faq(&listing);
        assert_eq!(faq.faq_title, "Frequently Asked Questions about Riverside Market");
        let questions: Vec<_> = faq
            .faq_body
            .iter()
            .map(|entry| entry.question.as_str())
            .collect();
        assert_eq!(
            questions,
            vec![
                "Can I order online from Riverside Market?",
                "Which payment methods does Riverside Market accept?",
                "Can I use food and nutrition assistance programs (FNAP) at Riverside Market?",
            ]
        );
    }

    #[rstest]
    fn faq_is_empty_without_profile() {
        assert!(faq(&Listing::new(2, "Quiet")).faq_body.is_empty());
    }
}
