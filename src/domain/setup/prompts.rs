//! Fixed guide messages and extraction prompts.

use super::product_domain::ProductDomain;

pub const GREETING: &str = "Hi! I'm here to help you set up analytics for your site. \
What type of product or app are you building?";

pub const ASK_SEGMENTS: &str = "Do you have different types of users? For example: \
free/paid, buyer/seller, admin/member, etc. (or just say 'no' if everyone is the same)";

pub const ASK_GOALS: &str = "What metrics or goals are most important to you? For example: \
conversion rate, retention, revenue, engagement, etc.";

/// How many actions the closing message names.
pub const CLOSING_ACTION_LIMIT: usize = 3;

/// Follow-up question about tracked actions, keyed by domain.
///
/// An unclassified conversation gets the `other` wording.
pub fn ask_actions(domain: Option<ProductDomain>) -> &'static str {
    match domain.unwrap_or(ProductDomain::Other) {
        ProductDomain::Ecommerce => {
            "Great! What user actions are most important to track? For example: \
             product views, add to cart, checkout, purchases, etc."
        }
        ProductDomain::Saas => {
            "Perfect! What features or actions do you want to track? For example: \
             sign-ups, feature usage, upgrades, invites, etc."
        }
        ProductDomain::Content => {
            "Excellent! What engagement actions matter most? For example: \
             article views, video plays, comments, shares, etc."
        }
        ProductDomain::Other => "Got it! What are the key user actions you want to track on your site?",
    }
}

/// Closing message naming up to the first three actions.
pub fn closing(key_actions: &[String]) -> String {
    let named = key_actions
        .iter()
        .take(CLOSING_ACTION_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Perfect! I understand you want to track: {named}. Now let's identify the specific \
         elements on your site. Click 'Start Labeling' to begin marking the buttons and \
         elements you want to track."
    )
}

pub fn classify_domain(description: &str) -> String {
    let domains = ProductDomain::ALL
        .iter()
        .map(|d| format!("- {}: {}", d.as_str(), d.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Classify this product into a domain:\n\nProduct description: {description}\n\nDomains:\n{domains}")
}

pub fn extract_actions(response: &str) -> String {
    format!(
        "Extract key actions/events from this response:\n\nUser response: {response}\n\n\
         Extract specific, actionable events. Convert to snake_case past tense where possible.\n\
         Example: \"add to cart\" -> \"added_to_cart\""
    )
}

pub fn extract_segments(response: &str) -> String {
    format!("Extract user segments/types from this response:\n\nUser response: {response}")
}

pub fn extract_goals(response: &str) -> String {
    format!("Extract business goals/metrics from this response:\n\nUser response: {response}")
}
