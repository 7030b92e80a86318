//! Business category of the product being instrumented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Classified product category.
///
/// Drives which follow-up question the guide asks about tracked actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductDomain {
    /// Online stores, marketplaces, retail.
    Ecommerce,
    /// B2B/B2C software products and platforms.
    Saas,
    /// Media, publishing, social networks.
    Content,
    /// Everything else.
    Other,
}

impl ProductDomain {
    pub const ALL: [ProductDomain; 4] = [
        ProductDomain::Ecommerce,
        ProductDomain::Saas,
        ProductDomain::Content,
        ProductDomain::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductDomain::Ecommerce => "ecommerce",
            ProductDomain::Saas => "saas",
            ProductDomain::Content => "content",
            ProductDomain::Other => "other",
        }
    }

    /// One-line description used when asking the model to classify.
    pub fn description(&self) -> &'static str {
        match self {
            ProductDomain::Ecommerce => "Online stores, marketplaces, retail",
            ProductDomain::Saas => "B2B/B2C software products, platforms",
            ProductDomain::Content => "Media, publishing, social networks",
            ProductDomain::Other => "Everything else",
        }
    }
}

impl fmt::Display for ProductDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductDomain::ALL
            .iter()
            .copied()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("domain", format!("unknown domain '{}'", s)))
    }
}
