//! Outbound checkout URL construction
//!
//! Renders the merged tracking set onto a fixed destination URL. Query
//! assignment is set/replace per key: parameters already embedded in the
//! destination are preserved unless the merged set carries the same key,
//! in which case the merged value wins without duplicating the key.
//!
//! Destination URLs are configuration constants, so a destination that
//! fails to parse is a programming error and is returned as a hard
//! `Error::BadDestination` rather than being swallowed. Misrouting a
//! paying customer is the one failure this pipeline refuses to tolerate.

use crate::params::{ParamMerger, TrackingParams};
use crate::{Error, Result};
use url::Url;

/// Builds outbound URLs from the merged parameter set.
#[derive(Clone)]
pub struct OutboundBuilder {
    merger: ParamMerger,
}

impl OutboundBuilder {
    pub fn new(merger: ParamMerger) -> Self {
        Self { merger }
    }

    /// Build the outbound URL for `destination`.
    ///
    /// Starts from the freshly merged (and persisted) parameter set,
    /// overlays caller-supplied `extra` parameters, and appends every
    /// non-empty value to the destination's query string.
    pub fn build(&self, destination: &str, extra: Option<&TrackingParams>) -> Result<String> {
        let merged = self.merger.merge();
        let full = match extra {
            Some(extra) => merged.overlaid_with(extra),
            None => merged,
        };
        append_params(destination, &full)
    }
}

/// Append `params` to `destination` with set/replace query semantics.
///
/// An empty parameter set returns the destination unchanged (no trailing
/// `?` artifact). Empty values are skipped. Encoding follows standard
/// form-urlencoding for query components.
pub fn append_params(destination: &str, params: &TrackingParams) -> Result<String> {
    let mut url = Url::parse(destination).map_err(|source| Error::BadDestination {
        url: destination.to_string(),
        source,
    })?;

    if params.iter().all(|(_, v)| v.is_empty()) {
        return Ok(destination.to_string());
    }

    // Destination-native pairs first, in their original order
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in params.iter() {
        if value.is_empty() {
            continue;
        }
        let mut found = false;
        pairs.retain_mut(|(k, v)| {
            if k == key {
                if found {
                    // Duplicate of a key we are setting: drop it
                    return false;
                }
                found = true;
                *v = value.to_string();
            }
            true
        });
        if !found {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    url.set_query(Some(&query));

    Ok(url.into())
}
