//! Pipeline facade: album metadata in, deduplicated credits out.
//!
//! The one public entry point of the crate.  Runs resolver → selector →
//! extractor and never fails: every upstream error degrades to an empty
//! credit list with whatever provenance was established, so the layer above
//! renders "no personnel data" instead of an error page.

use tracing::{debug, warn};

use crate::extractor::{self, CreditsResult};
use crate::resolver;
use crate::selector;
use crate::service::{AlbumQuery, MetadataService};

/// Default bound on per-group relation probes (see [`selector`]).
pub const DEFAULT_PROBE_LIMIT: usize = 6;

/// Resolves album credits through an injected [`MetadataService`].
///
/// Stateless across calls; concurrent invocations share nothing but the
/// service.  Dropping the returned future abandons any in-flight requests.
pub struct CreditsPipeline<S> {
    service: S,
    probe_limit: usize,
}

impl<S: MetadataService> CreditsPipeline<S> {
    pub fn new(service: S) -> Self {
        CreditsPipeline {
            service,
            probe_limit: DEFAULT_PROBE_LIMIT,
        }
    }

    pub fn with_probe_limit(service: S, probe_limit: usize) -> Self {
        CreditsPipeline {
            service,
            probe_limit,
        }
    }

    /// Resolve the query, pick a release, extract its credits.
    ///
    /// Infallible by contract: no-match and upstream failures both come back
    /// as an empty credit list.
    pub async fn get_credits(&self, query: &AlbumQuery) -> CreditsResult {
        let target = resolver::resolve_target(&self.service, query).await;
        if target.is_empty() {
            debug!(title = %query.title, artist = %query.artist, "no candidate matched");
            return CreditsResult::empty(None);
        }

        let release_id = if let Some(id) = target.release_id.clone() {
            Some(id)
        } else if let Some(group_id) = target.group_id.as_deref() {
            match selector::select_release(&self.service, group_id, self.probe_limit).await {
                Ok(selected) => selected,
                Err(error) => {
                    warn!(group = group_id, %error, "release selection failed");
                    None
                }
            }
        } else {
            None
        };

        let Some(release_id) = release_id else {
            return CreditsResult::empty(target.group_id);
        };

        match extractor::extract_credits(&self.service, &release_id).await {
            Ok(result) => result,
            Err(error) => {
                warn!(release = %release_id, %error, "credit extraction failed");
                CreditsResult::empty(Some(release_id))
            }
        }
    }
}
