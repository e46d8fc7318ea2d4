//! Metadata-service abstraction and the records flowing through the pipeline.
//!
//! The pipeline never talks HTTP directly: every lookup goes through
//! [`MetadataService`], so tests inject canned responses and the concrete
//! client ([`crate::musicbrainz::MusicBrainzClient`]) stays swappable.
//! Empty result vectors mean "nothing found"; errors are reserved for
//! transport and decoding failures, which callers degrade to "no result".

use async_trait::async_trait;

use crate::error::ClientError;

/// Album metadata to resolve, as supplied by the catalog provider.
#[derive(Debug, Clone)]
pub struct AlbumQuery {
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
}

impl AlbumQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, year: Option<i32>) -> Self {
        AlbumQuery {
            title: title.into(),
            artist: artist.into(),
            year,
        }
    }
}

/// One search hit: a release-group or a concrete release.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    /// Ordered contributor names from the artist credit.
    pub artist_credit: Vec<String>,
    /// Classification of a release-group hit, e.g. "Album".
    pub primary_type: Option<String>,
    /// Owning release-group of a release hit, when the search reports one.
    pub group_id: Option<String>,
    /// Release (or first-release) year, when the search reports a date.
    pub year: Option<i32>,
}

impl Candidate {
    /// Artist credit joined into a single phrase for scoring.
    pub fn credit_phrase(&self) -> String {
        self.artist_credit.join(" ")
    }
}

/// Resolution outcome: a release-group, a concrete release, both, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub group_id: Option<String>,
    pub release_id: Option<String>,
}

impl ResolvedTarget {
    /// True when no strategy produced a match.
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none() && self.release_id.is_none()
    }
}

/// Member release of a release-group.
#[derive(Debug, Clone)]
pub struct GroupRelease {
    pub id: String,
    pub status: Option<String>,
}

/// A typed relation attached to a release or to one of its track recordings.
///
/// The linked artist (when the relation carries one) is already folded in by
/// the decoding layer; the remaining fields are the fallback name sources in
/// precedence order.
#[derive(Debug, Clone, Default)]
pub struct Relation {
    pub rel_type: Option<String>,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub target_credit: Option<String>,
    pub credit_phrase: Option<String>,
    pub name: Option<String>,
}

/// A release with its relation graph, ready for credit extraction.
#[derive(Debug, Clone, Default)]
pub struct ReleaseDetail {
    pub relations: Vec<Relation>,
    pub media: Vec<Medium>,
}

#[derive(Debug, Clone, Default)]
pub struct Medium {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    /// Relations on this track's recording.
    pub recording_relations: Vec<Relation>,
}

/// Search and lookup operations the pipeline needs from the metadata service.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Search release-groups by exact-quoted title and artist, optionally
    /// constrained to a release year.
    async fn search_release_groups(
        &self,
        title: &str,
        artist: &str,
        year: Option<i32>,
    ) -> Result<Vec<Candidate>, ClientError>;

    /// Search individual releases the same way.
    async fn search_releases(
        &self,
        title: &str,
        artist: &str,
        year: Option<i32>,
    ) -> Result<Vec<Candidate>, ClientError>;

    /// List the member releases of a release-group.
    async fn group_releases(&self, group_id: &str) -> Result<Vec<GroupRelease>, ClientError>;

    /// Fetch a release with full relationship/track/recording inclusion.
    async fn release_detail(&self, release_id: &str) -> Result<ReleaseDetail, ClientError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{Candidate, GroupRelease, MetadataService, Relation, ReleaseDetail};
    use crate::error::ClientError;

    /// Canned-response [`MetadataService`] with per-endpoint call counters.
    #[derive(Default)]
    pub struct MockService {
        pub groups_with_year: Vec<Candidate>,
        pub groups_no_year: Vec<Candidate>,
        /// Overrides for group searches keyed by the searched title.
        pub groups_by_title: HashMap<String, Vec<Candidate>>,
        pub releases_with_year: Vec<Candidate>,
        pub releases_no_year: Vec<Candidate>,
        pub group_members: HashMap<String, Vec<GroupRelease>>,
        pub details: HashMap<String, ReleaseDetail>,
        /// Release ids whose detail fetch fails with a 503.
        pub broken_details: Vec<String>,
        /// Fail every group search with a 503.
        pub fail_group_search: bool,
        pub group_search_calls: AtomicUsize,
        pub release_search_calls: AtomicUsize,
        pub browse_calls: AtomicUsize,
        pub detail_calls: AtomicUsize,
        pub searched_group_titles: Mutex<Vec<String>>,
    }

    pub fn candidate(id: &str, title: &str, artist: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: title.to_string(),
            artist_credit: vec![artist.to_string()],
            primary_type: None,
            group_id: None,
            year: None,
        }
    }

    pub fn member(id: &str, status: Option<&str>) -> GroupRelease {
        GroupRelease {
            id: id.to_string(),
            status: status.map(str::to_string),
        }
    }

    pub fn relation(rel_type: &str, artist_name: &str, artist_id: Option<&str>) -> Relation {
        Relation {
            rel_type: Some(rel_type.to_string()),
            artist_id: artist_id.map(str::to_string),
            artist_name: Some(artist_name.to_string()),
            ..Relation::default()
        }
    }

    fn unavailable(endpoint: &str) -> ClientError {
        ClientError::Status {
            endpoint: endpoint.to_string(),
            status: 503,
        }
    }

    #[async_trait]
    impl MetadataService for MockService {
        async fn search_release_groups(
            &self,
            title: &str,
            _artist: &str,
            year: Option<i32>,
        ) -> Result<Vec<Candidate>, ClientError> {
            self.group_search_calls.fetch_add(1, Ordering::SeqCst);
            self.searched_group_titles
                .lock()
                .unwrap()
                .push(title.to_string());
            if self.fail_group_search {
                return Err(unavailable("release-group"));
            }
            if let Some(hits) = self.groups_by_title.get(title) {
                return Ok(hits.clone());
            }
            Ok(if year.is_some() {
                self.groups_with_year.clone()
            } else {
                self.groups_no_year.clone()
            })
        }

        async fn search_releases(
            &self,
            _title: &str,
            _artist: &str,
            year: Option<i32>,
        ) -> Result<Vec<Candidate>, ClientError> {
            self.release_search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(if year.is_some() {
                self.releases_with_year.clone()
            } else {
                self.releases_no_year.clone()
            })
        }

        async fn group_releases(&self, group_id: &str) -> Result<Vec<GroupRelease>, ClientError> {
            self.browse_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.group_members.get(group_id).cloned().unwrap_or_default())
        }

        async fn release_detail(&self, release_id: &str) -> Result<ReleaseDetail, ClientError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_details.iter().any(|id| id == release_id) {
                return Err(unavailable("release"));
            }
            Ok(self.details.get(release_id).cloned().unwrap_or_default())
        }
    }
}
