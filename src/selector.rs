//! Representative-release selection within a release-group.
//!
//! A release-group bundles every edition of an album, and most editions
//! carry no relationship data at all.  Probe a bounded sample of (preferably
//! official) member releases and pick the one with the richest relation
//! graph: that is the edition worth extracting credits from.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::service::{GroupRelease, MetadataService, Relation, ReleaseDetail};

/// Pick the member release of `group_id` with the most release- and
/// recording-level relations.
///
/// Returns `Ok(None)` when the group has no releases.  Probes run
/// concurrently; a failed probe scores that candidate 0 without disturbing
/// the others.  When every probe scores 0 the first candidate (official
/// preferred) is used as a fallback.
pub async fn select_release<S: MetadataService + ?Sized>(
    service: &S,
    group_id: &str,
    probe_limit: usize,
) -> Result<Option<String>, ClientError> {
    let releases = service.group_releases(group_id).await?;
    if releases.is_empty() {
        return Ok(None);
    }

    let officials: Vec<&GroupRelease> = releases
        .iter()
        .filter(|release| {
            release
                .status
                .as_deref()
                .is_some_and(|status| status.eq_ignore_ascii_case("official"))
        })
        .collect();
    let candidates: Vec<&GroupRelease> = if officials.is_empty() {
        releases.iter().collect()
    } else {
        officials
    };

    // Bounded sample keeps request volume polite with the provider.
    let sample = &candidates[..candidates.len().min(probe_limit)];
    let probes = sample.iter().map(|release| async move {
        let count = match service.release_detail(&release.id).await {
            Ok(detail) => relation_count(&detail),
            Err(error) => {
                warn!(release = %release.id, %error, "relation probe failed");
                0
            }
        };
        (release.id.clone(), count)
    });
    let mut scored: Vec<(String, usize)> = join_all(probes).await;

    scored.sort_by(|a, b| b.1.cmp(&a.1)); // stable: fetch order breaks ties
    let best = scored
        .iter()
        .find(|(_, count)| *count > 0)
        .map(|(id, _)| id.clone())
        .or_else(|| candidates.first().map(|release| release.id.clone()));

    debug!(group = group_id, selected = best.as_deref(), probed = sample.len(), "release selected");
    Ok(best)
}

/// Total typed relations on the release plus on every track recording.
fn relation_count(detail: &ReleaseDetail) -> usize {
    let release_level = detail.relations.iter().filter(|rel| has_type(rel)).count();
    let recording_level = detail
        .media
        .iter()
        .flat_map(|medium| &medium.tracks)
        .flat_map(|track| &track.recording_relations)
        .filter(|rel| has_type(rel))
        .count();
    release_level + recording_level
}

fn has_type(relation: &Relation) -> bool {
    relation
        .rel_type
        .as_deref()
        .is_some_and(|rel_type| !rel_type.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::service::mock::{member, relation, MockService};
    use crate::service::{Medium, Track};

    fn detail_with(release_relations: usize, recording_relations: usize) -> ReleaseDetail {
        ReleaseDetail {
            relations: (0..release_relations)
                .map(|i| relation("producer", &format!("P{i}"), None))
                .collect(),
            media: vec![Medium {
                tracks: vec![Track {
                    recording_relations: (0..recording_relations)
                        .map(|i| relation("mixer", &format!("M{i}"), None))
                        .collect(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn empty_group_yields_none() {
        let service = MockService::default();
        let selected = select_release(&service, "rg-empty", 6).await.unwrap();
        assert!(selected.is_none());
    }

    #[tokio::test]
    async fn richest_release_wins() {
        let mut service = MockService::default();
        service.group_members.insert(
            "rg-okc".to_string(),
            vec![
                member("rel-sparse", Some("Official")),
                member("rel-rich", Some("Official")),
            ],
        );
        service.details.insert("rel-sparse".to_string(), detail_with(1, 0));
        service.details.insert("rel-rich".to_string(), detail_with(2, 7));

        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(selected.as_deref(), Some("rel-rich"));
    }

    #[tokio::test]
    async fn official_releases_shadow_the_rest() {
        let mut service = MockService::default();
        service.group_members.insert(
            "rg-okc".to_string(),
            vec![
                member("rel-bootleg", Some("Bootleg")),
                member("rel-official", Some("Official")),
            ],
        );
        // the bootleg is richer, but only officials get probed
        service.details.insert("rel-bootleg".to_string(), detail_with(9, 9));
        service.details.insert("rel-official".to_string(), detail_with(1, 0));

        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(selected.as_deref(), Some("rel-official"));
        assert_eq!(service.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_unfiltered_when_nothing_is_official() {
        let mut service = MockService::default();
        service.group_members.insert(
            "rg-okc".to_string(),
            vec![member("rel-promo", Some("Promotion")), member("rel-none", None)],
        );
        service.details.insert("rel-none".to_string(), detail_with(0, 3));

        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(selected.as_deref(), Some("rel-none"));
    }

    #[tokio::test]
    async fn all_zero_probes_fall_back_to_first_candidate() {
        let mut service = MockService::default();
        service.group_members.insert(
            "rg-okc".to_string(),
            vec![
                member("rel-first", Some("Official")),
                member("rel-second", Some("Official")),
            ],
        );
        // no details registered: every probe decodes to an empty graph

        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(selected.as_deref(), Some("rel-first"));
    }

    #[tokio::test]
    async fn probe_failure_degrades_that_candidate_only() {
        let mut service = MockService::default();
        service.group_members.insert(
            "rg-okc".to_string(),
            vec![
                member("rel-broken", Some("Official")),
                member("rel-ok", Some("Official")),
            ],
        );
        service.broken_details.push("rel-broken".to_string());
        service.details.insert("rel-ok".to_string(), detail_with(1, 2));

        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(selected.as_deref(), Some("rel-ok"));
    }

    #[tokio::test]
    async fn probe_volume_is_bounded() {
        let mut service = MockService::default();
        let members: Vec<_> = (0..10)
            .map(|i| member(&format!("rel-{i}"), Some("Official")))
            .collect();
        service.group_members.insert("rg-okc".to_string(), members);
        service.details.insert("rel-9".to_string(), detail_with(5, 5));

        // the rich release sits beyond the probe bound, so it is never seen
        let selected = select_release(&service, "rg-okc", 6).await.unwrap();
        assert_eq!(service.detail_calls.load(Ordering::SeqCst), 6);
        assert_eq!(selected.as_deref(), Some("rel-0"));
    }

    #[test]
    fn relation_count_ignores_untyped_relations() {
        let mut detail = detail_with(2, 1);
        detail.relations.push(Relation::default());
        detail.relations.push(Relation {
            rel_type: Some(String::new()),
            ..Relation::default()
        });
        assert_eq!(relation_count(&detail), 3);
    }
}
