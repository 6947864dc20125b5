use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Currency assumed when a retailer page does not expose one.
pub const DEFAULT_CURRENCY: &str = "MDL";

/// One of the six retailers whose catalogs are scraped.
///
/// Slugs never contain `_`, which keeps [`combined_key`] unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retailer {
    Conditionere,
    Eurosanteh,
    Gree,
    Jara,
    Termoformat,
    Termocontrol,
}

impl Retailer {
    pub const ALL: [Retailer; 6] = [
        Retailer::Conditionere,
        Retailer::Eurosanteh,
        Retailer::Gree,
        Retailer::Jara,
        Retailer::Termoformat,
        Retailer::Termocontrol,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Retailer::Conditionere => "conditionere",
            Retailer::Eurosanteh => "eurosanteh",
            Retailer::Gree => "gree",
            Retailer::Jara => "jara",
            Retailer::Termoformat => "termoformat",
            Retailer::Termocontrol => "termocontrol",
        }
    }
}

impl std::fmt::Display for Retailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Retailer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Retailer::ALL
            .into_iter()
            .find(|r| r.slug() == wanted)
            .ok_or_else(|| CoreError::UnknownRetailer(s.to_string()))
    }
}

/// Identifier of a listing in the combined snapshot: `{retailer}_{url}`.
#[must_use]
pub fn combined_key(retailer: Retailer, url: &str) -> String {
    format!("{}_{url}", retailer.slug())
}

/// One scraped product offering, normalized across retailers.
///
/// The persistence timestamp is not part of the record; it is assigned by the
/// store at write time so that it never leaks into the content fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    /// Absolute product link; the dedupe key within one retailer.
    pub url: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub btu: Option<i32>,
    /// Recommended room size in square meters.
    pub service_area: Option<f64>,
    pub store: Retailer,
}

impl ListingRecord {
    /// Creates a record with only the identifying fields set.
    ///
    /// Returns `None` when `name` or `url` is blank after trimming; such
    /// listings are discarded during extraction.
    #[must_use]
    pub fn new(name: &str, url: &str, store: Retailer) -> Option<Self> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            url: url.to_string(),
            price: None,
            currency: DEFAULT_CURRENCY.to_string(),
            btu: None,
            service_area: None,
            store,
        })
    }

    /// `true` when both identifying fields are non-blank.
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        !self.name.trim().is_empty() && !self.url.trim().is_empty()
    }

    /// Overlays fields found on a detail page. Absent fields keep their
    /// list-page values.
    pub fn merge_detail(&mut self, detail: DetailFields) {
        if let Some(name) = detail.name.filter(|n| !n.trim().is_empty()) {
            self.name = name.trim().to_string();
        }
        if detail.price.is_some() {
            self.price = detail.price;
        }
        if let Some(currency) = detail.currency.filter(|c| !c.trim().is_empty()) {
            self.currency = currency.trim().to_string();
        }
        if detail.btu.is_some() {
            self.btu = detail.btu;
        }
        if detail.service_area.is_some() {
            self.service_area = detail.service_area;
        }
    }
}

/// Fields extracted from a single product detail page. Every field is
/// optional; missing markup leaves the corresponding entry `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub btu: Option<i32>,
    pub service_area: Option<f64>,
}

impl DetailFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.btu.is_none()
            && self.service_area.is_none()
    }
}
