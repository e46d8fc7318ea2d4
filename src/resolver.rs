//! Cascading release resolution.
//!
//! Resolves a catalog (title, artist, year) query to a MusicBrainz
//! release-group or release by trying an ordered sequence of search
//! strategies, stopping at the first stage that produces a positive-scoring
//! candidate.  A failed search is the same as an empty one: the cascade
//! keeps going and the caller never sees an error.

use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::score::{title_artist_score, year_bonus};
use crate::service::{AlbumQuery, Candidate, MetadataService, ResolvedTarget};

/// Extra points for a release-group classified as an album.
const ALBUM_BONUS: u32 = 1;

/// One stage of the search cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStage {
    /// Release-group search; `with_year` controls the date term.
    Groups { with_year: bool },
    /// Individual-release search.
    Releases { with_year: bool },
    /// Release-group retry with the normalized title.
    NormalizedGroups,
}

impl SearchStage {
    fn is_group_stage(self) -> bool {
        matches!(self, SearchStage::Groups { .. } | SearchStage::NormalizedGroups)
    }

    /// Year passed to the search and to the scorer for this stage.
    fn year(self, query: &AlbumQuery) -> Option<i32> {
        match self {
            SearchStage::Groups { with_year } | SearchStage::Releases { with_year } => {
                if with_year {
                    query.year
                } else {
                    None
                }
            }
            SearchStage::NormalizedGroups => query.year,
        }
    }
}

/// Build the stage plan for a query.  Adding, removing, or reordering
/// strategies is an edit here, not in the control flow below.
fn stage_plan(query: &AlbumQuery) -> Vec<SearchStage> {
    let has_year = query.year.is_some();
    let mut plan = vec![SearchStage::Groups { with_year: has_year }];
    if has_year {
        plan.push(SearchStage::Groups { with_year: false });
    }
    plan.push(SearchStage::Releases { with_year: has_year });
    if has_year {
        plan.push(SearchStage::Releases { with_year: false });
    }
    if normalize(&query.title) != query.title {
        plan.push(SearchStage::NormalizedGroups);
    }
    plan
}

/// Resolve a query to a release-group and/or release id.
///
/// Returns the empty target when every stage comes up empty or scores 0.
pub async fn resolve_target<S: MetadataService + ?Sized>(
    service: &S,
    query: &AlbumQuery,
) -> ResolvedTarget {
    for stage in stage_plan(query) {
        let candidates = run_stage(service, query, stage).await;
        if let Some(target) = best_target(&candidates, query, stage) {
            debug!(?stage, ?target, "resolver matched");
            return target;
        }
    }
    debug!(title = %query.title, artist = %query.artist, "resolver exhausted all stages");
    ResolvedTarget::default()
}

async fn run_stage<S: MetadataService + ?Sized>(
    service: &S,
    query: &AlbumQuery,
    stage: SearchStage,
) -> Vec<Candidate> {
    let year = stage.year(query);
    let result = match stage {
        SearchStage::Groups { .. } => {
            service
                .search_release_groups(&query.title, &query.artist, year)
                .await
        }
        SearchStage::Releases { .. } => {
            service.search_releases(&query.title, &query.artist, year).await
        }
        SearchStage::NormalizedGroups => {
            service
                .search_release_groups(&normalize(&query.title), &query.artist, year)
                .await
        }
    };

    match result {
        Ok(candidates) => candidates,
        Err(error) => {
            warn!(?stage, %error, "search stage failed");
            Vec::new()
        }
    }
}

/// Score a stage's candidates and pick the best positive one.
///
/// Sorting is stable, so ties keep provider response order.  A best score of
/// 0 means the stage found nothing usable and the cascade continues.
fn best_target(
    candidates: &[Candidate],
    query: &AlbumQuery,
    stage: SearchStage,
) -> Option<ResolvedTarget> {
    let year = stage.year(query);
    let mut scored: Vec<(u32, &Candidate)> = candidates
        .iter()
        .map(|candidate| (score_candidate(candidate, query, stage, year), candidate))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let (score, best) = scored.first()?;
    if *score == 0 {
        return None;
    }

    Some(if stage.is_group_stage() {
        ResolvedTarget {
            group_id: Some(best.id.clone()),
            release_id: None,
        }
    } else {
        ResolvedTarget {
            group_id: best.group_id.clone(),
            release_id: Some(best.id.clone()),
        }
    })
}

fn score_candidate(
    candidate: &Candidate,
    query: &AlbumQuery,
    stage: SearchStage,
    year: Option<i32>,
) -> u32 {
    let mut score = title_artist_score(
        &candidate.title,
        &candidate.credit_phrase(),
        &query.title,
        &query.artist,
    );
    score += year_bonus(candidate.year, year);
    if stage.is_group_stage()
        && candidate
            .primary_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("album"))
    {
        score += ALBUM_BONUS;
    }
    score
}
