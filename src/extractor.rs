//! Credit extraction from a release's relation graph.
//!
//! Flattens release-level and per-recording relations into a deduplicated
//! list of (role, contributor) facts.  Malformed or partial relations are
//! skipped one at a time; a missing field never fails the whole release.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ClientError;
use crate::service::{MetadataService, Relation};

/// Provenance identifier carried on every result.
pub const SOURCE: &str = "musicbrainz";

/// Where a credit was attached in the release's relation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditScope {
    Release,
    Recording,
}

/// A flattened (role, contributor) fact surfaced to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    /// Role name, lowercased (e.g. "producer", "mixer").
    pub role: String,
    /// Contributor display name.
    pub name: String,
    /// Provider id of the linked contributor, when the relation carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_id: Option<String>,
    pub scope: CreditScope,
}

/// Deduplicated credits plus provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsResult {
    pub source: &'static str,
    /// Group or release id the credits were resolved through, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<String>,
    pub credits: Vec<Credit>,
}

impl CreditsResult {
    /// An empty result carrying whatever provenance was established.
    pub(crate) fn empty(matched_id: Option<String>) -> Self {
        CreditsResult {
            source: SOURCE,
            matched_id,
            credits: Vec::new(),
        }
    }
}

/// Fetch `release_id` with full relation inclusion and flatten its typed
/// relations into a deduplicated credit list.
///
/// Release-level relations come first, then every medium's tracks in order;
/// duplicates by case-insensitive (role, name) keep the first occurrence.
pub async fn extract_credits<S: MetadataService + ?Sized>(
    service: &S,
    release_id: &str,
) -> Result<CreditsResult, ClientError> {
    let detail = service.release_detail(release_id).await?;

    let mut credits = Vec::new();
    for relation in &detail.relations {
        push_credit(&mut credits, relation, CreditScope::Release);
    }
    for medium in &detail.media {
        for track in &medium.tracks {
            for relation in &track.recording_relations {
                push_credit(&mut credits, relation, CreditScope::Recording);
            }
        }
    }

    dedup(&mut credits);

    Ok(CreditsResult {
        source: SOURCE,
        matched_id: Some(release_id.to_string()),
        credits,
    })
}

/// Emit a credit when the relation has a role and a resolvable contributor
/// name.  Name precedence: linked artist, target credit, credit phrase, raw
/// name; first non-empty wins.
fn push_credit(credits: &mut Vec<Credit>, relation: &Relation, scope: CreditScope) {
    let Some(role) = relation.rel_type.as_deref().filter(|role| !role.is_empty()) else {
        return;
    };
    let name = [
        relation.artist_name.as_deref(),
        relation.target_credit.as_deref(),
        relation.credit_phrase.as_deref(),
        relation.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|name| !name.is_empty());
    let Some(name) = name else {
        return;
    };

    credits.push(Credit {
        role: role.to_lowercase(),
        name: name.to_string(),
        contributor_id: relation.artist_id.clone(),
        scope,
    });
}

/// Keep the first occurrence of each case-insensitive (role, name) pair.
fn dedup(credits: &mut Vec<Credit>) {
    let mut seen = HashSet::new();
    credits.retain(|credit| seen.insert(format!("{}::{}", credit.role, credit.name.to_lowercase())));
}
