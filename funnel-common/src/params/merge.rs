//! Parameter merging for a page view
//!
//! Computes the canonical tracking set for the current page: previously
//! stored parameters overlaid with whatever the active URL carries.
//! Current-URL values win so a later ad click can re-attribute the
//! session, while identifiers picked up earlier in the funnel still
//! propagate to pages that carry no query string of their own.

use crate::params::TrackingParams;
use crate::store::ParameterStore;
use url::Url;

/// Merges stored attribution with the active page URL's parameters.
#[derive(Clone)]
pub struct ParamMerger {
    store: ParameterStore,
    page_url: Url,
}

impl ParamMerger {
    pub fn new(store: ParameterStore, page_url: Url) -> Self {
        Self { store, page_url }
    }

    /// Recognized tracking parameters present on the active page URL
    pub fn current_url_params(&self) -> TrackingParams {
        TrackingParams::from_url(&self.page_url)
    }

    /// Canonical parameter set for this page view.
    ///
    /// Stored values overlaid with current-URL values (current URL wins
    /// per key). The merged result is persisted synchronously before this
    /// returns, so any outbound navigation built afterwards sees it.
    pub fn merge(&self) -> TrackingParams {
        let stored = self.store.load();
        let merged = stored.overlaid_with(&self.current_url_params());
        self.store.save(&merged);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn merger(page_url: &str) -> ParamMerger {
        let store = ParameterStore::new(Arc::new(MemoryStore::new()));
        ParamMerger::new(store, Url::parse(page_url).unwrap())
    }

    #[test]
    fn test_merge_is_idempotent() {
        let merger = merger("https://site.test/?utm_source=fb&fbclid=123");
        let first = merger.merge();
        let second = merger.merge();
        assert_eq!(first, second);
    }

    #[test]
    fn test_current_url_wins_over_stored() {
        let store = ParameterStore::new(Arc::new(MemoryStore::new()));
        let mut stored = TrackingParams::new();
        stored.insert("utm_source", "google");
        stored.insert("gclid", "g-1");
        store.save(&stored);

        let merger = ParamMerger::new(
            store,
            Url::parse("https://site.test/?utm_source=fb&fbclid=f-1").unwrap(),
        );
        let merged = merger.merge();

        assert_eq!(merged.get("utm_source"), Some("fb"));
        assert_eq!(merged.get("gclid"), Some("g-1"));
        assert_eq!(merged.get("fbclid"), Some("f-1"));
    }

    #[test]
    fn test_merge_persists_before_returning() {
        let session = Arc::new(MemoryStore::new());
        let store = ParameterStore::new(session.clone());
        let merger = ParamMerger::new(
            store.clone(),
            Url::parse("https://site.test/?click_id=abc").unwrap(),
        );

        let merged = merger.merge();
        // A fresh load straight from storage sees exactly what merge returned
        assert_eq!(store.load(), merged);
    }

    #[test]
    fn test_stored_params_survive_bare_navigation() {
        let session = Arc::new(MemoryStore::new());

        // Page 1 carries the ad click
        let page1 = ParamMerger::new(
            ParameterStore::new(session.clone()),
            Url::parse("https://site.test/?utm_source=fb&fbclid=123").unwrap(),
        );
        page1.merge();

        // Page 2 has no query string of its own
        let page2 = ParamMerger::new(
            ParameterStore::new(session),
            Url::parse("https://site.test/checkout").unwrap(),
        );
        let merged = page2.merge();

        assert_eq!(merged.get("utm_source"), Some("fb"));
        assert_eq!(merged.get("fbclid"), Some("123"));
    }
}
