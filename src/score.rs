//! Candidate scoring against a target (title, artist, year) query.
//!
//! Scores are small additive integers; higher is better, ties are broken by
//! provider response order.  Both sides are normalized before comparison, so
//! "OK Computer (Remastered)" and "ok computer" score as an exact title match.

use crate::normalize::normalize;

/// Points for an exact normalized title match.
const TITLE_EXACT: u32 = 3;
/// Points for substring containment (either direction) of normalized titles.
const TITLE_CONTAINS: u32 = 2;
/// Points for substring containment (either direction) of normalized artists.
const ARTIST_CONTAINS: u32 = 2;

/// Score a candidate's title and artist against the wanted ones.
///
/// Title component: exact normalized equality scores [`TITLE_EXACT`],
/// otherwise containment either way scores [`TITLE_CONTAINS`], otherwise 0.
/// Artist component: containment either way scores [`ARTIST_CONTAINS`].
/// Deterministic and pure: identical inputs always produce the same score.
pub fn title_artist_score(
    candidate_title: &str,
    candidate_artist: &str,
    want_title: &str,
    want_artist: &str,
) -> u32 {
    let t = normalize(want_title);
    let a = normalize(want_artist);
    let ct = normalize(candidate_title);
    let ca = normalize(candidate_artist);

    let mut score = 0;
    if ct == t {
        score += TITLE_EXACT;
    } else if ct.contains(&t) || t.contains(&ct) {
        score += TITLE_CONTAINS;
    }
    if ca.contains(&a) || a.contains(&ca) {
        score += ARTIST_CONTAINS;
    }
    score
}

/// +1 when the candidate's year is known and matches the wanted year exactly.
pub fn year_bonus(candidate_year: Option<i32>, want_year: Option<i32>) -> u32 {
    match (candidate_year, want_year) {
        (Some(candidate), Some(want)) if candidate == want => 1,
        _ => 0,
    }
}
