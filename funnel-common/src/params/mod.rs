//! Tracking parameter model
//!
//! A `TrackingParams` map carries the campaign identifiers, click IDs and
//! pass-through contact fields observed on inbound page URLs. Values are
//! opaque strings: they are never validated or interpreted, only filtered
//! by key, persisted, merged and re-emitted on outbound links.

mod merge;

pub use merge::ParamMerger;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Query-string keys recognized as tracking parameters.
///
/// Anything not on this list is ignored when reading the page URL.
/// Covers campaign tags (utm_*), per-platform click IDs, affiliate/sub IDs,
/// and contact fields passed through from upstream ad platforms.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ttclid",
    "twclid",
    "li_fat_id",
    "affiliate_id",
    "sub_id",
    "click_id",
    "transaction_id",
    "order_id",
    "customer_id",
    "email",
    "phone",
    "first_name",
    "last_name",
    "address",
    "city",
    "state",
    "zip",
    "country",
];

/// Returns true if `key` is on the recognized tracking-key list
pub fn is_recognized_key(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

/// A flat name → value map of tracking identifiers.
///
/// Backed by a `BTreeMap` so iteration (and therefore serialization and
/// outbound URL appending) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingParams(BTreeMap<String, String>);

impl TrackingParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract recognized tracking parameters from a page URL.
    ///
    /// Query values are percent-decoded by the URL parser; unrecognized
    /// query parameters are ignored. Repeated keys keep the last value.
    pub fn from_url(url: &Url) -> Self {
        let mut params = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            if is_recognized_key(&key) {
                params.insert(key.into_owned(), value.into_owned());
            }
        }
        Self(params)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` onto `self`: keys present in `other` win, keys
    /// absent from `other` keep their existing value.
    pub fn overlaid_with(&self, other: &TrackingParams) -> TrackingParams {
        let mut merged = self.0.clone();
        for (k, v) in &other.0 {
            merged.insert(k.clone(), v.clone());
        }
        TrackingParams(merged)
    }
}

impl FromIterator<(String, String)> for TrackingParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
