//! MusicBrainz WS/2 client.
//!
//! Implements [`MetadataService`] over the JSON web service.  Politeness per
//! the MusicBrainz terms: an identifying User-Agent, bounded timeouts, and a
//! shared rate limiter with adaptive backoff.  Payloads are decoded through
//! typed response structs into the pipeline's domain records, so the
//! "missing field" policy lives here and nowhere else.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::rate_limiter::RateLimiter;
use crate::service::{
    Candidate, GroupRelease, Medium, MetadataService, Relation, ReleaseDetail, Track,
};

/// Relationship inclusions for release lookups: release-level and
/// per-recording relations plus the track listing they hang off.
const RELATION_INC: &str = "recordings+media+artist-credits+labels+url-rels+recording-rels+artist-rels+label-rels+work-rels";

// ── API response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GroupSearchResponse {
    #[serde(rename = "release-groups", default)]
    release_groups: Vec<ApiReleaseGroup>,
}

#[derive(Debug, Deserialize)]
struct ApiReleaseGroup {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ApiArtistCredit>,
    #[serde(rename = "primary-type")]
    primary_type: Option<String>,
    #[serde(rename = "first-release-date")]
    first_release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArtistCredit {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseSearchResponse {
    #[serde(default)]
    releases: Vec<ApiSearchRelease>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchRelease {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ApiArtistCredit>,
    #[serde(rename = "release-group")]
    release_group: Option<ApiGroupRef>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiGroupRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GroupDetailResponse {
    #[serde(default)]
    releases: Vec<ApiGroupRelease>,
}

#[derive(Debug, Deserialize)]
struct ApiGroupRelease {
    id: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiReleaseDetail {
    #[serde(default)]
    relations: Vec<ApiRelation>,
    #[serde(default)]
    media: Vec<ApiMedium>,
}

#[derive(Debug, Deserialize)]
struct ApiMedium {
    #[serde(default)]
    tracks: Vec<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    recording: Option<ApiRecording>,
}

#[derive(Debug, Deserialize)]
struct ApiRecording {
    #[serde(default)]
    relations: Vec<ApiRelation>,
}

#[derive(Debug, Deserialize)]
struct ApiRelation {
    #[serde(rename = "type")]
    rel_type: Option<String>,
    artist: Option<ApiArtistRef>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ApiRelationCredit>,
    #[serde(rename = "target-credit")]
    target_credit: Option<String>,
    #[serde(rename = "artist-credit-phrase")]
    credit_phrase: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRelationCredit {
    artist: Option<ApiArtistRef>,
}

#[derive(Debug, Deserialize)]
struct ApiArtistRef {
    id: Option<String>,
    name: Option<String>,
}

// ── Decoding into domain records ─────────────────────────────────────────────

/// Parse the year out of a WS/2 date string ("1997-05-21", "1997", …).
fn parse_year(date: Option<&str>) -> Option<i32> {
    let head: String = date?.chars().take(4).collect();
    if head.len() == 4 {
        head.parse().ok()
    } else {
        None
    }
}

impl From<ApiReleaseGroup> for Candidate {
    fn from(api: ApiReleaseGroup) -> Self {
        Candidate {
            id: api.id,
            title: api.title,
            artist_credit: api.artist_credit.into_iter().map(|ac| ac.name).collect(),
            primary_type: api.primary_type,
            group_id: None,
            year: parse_year(api.first_release_date.as_deref()),
        }
    }
}

impl From<ApiSearchRelease> for Candidate {
    fn from(api: ApiSearchRelease) -> Self {
        Candidate {
            id: api.id,
            title: api.title,
            artist_credit: api.artist_credit.into_iter().map(|ac| ac.name).collect(),
            primary_type: None,
            group_id: api.release_group.map(|group| group.id),
            year: parse_year(api.date.as_deref()),
        }
    }
}

impl From<ApiRelation> for Relation {
    fn from(api: ApiRelation) -> Self {
        // The linked artist lives either directly on the relation or inside
        // its first artist credit.
        let linked = api
            .artist
            .or_else(|| api.artist_credit.into_iter().next().and_then(|credit| credit.artist));
        Relation {
            rel_type: api.rel_type,
            artist_id: linked.as_ref().and_then(|artist| artist.id.clone()),
            artist_name: linked.and_then(|artist| artist.name),
            target_credit: api.target_credit,
            credit_phrase: api.credit_phrase,
            name: api.name,
        }
    }
}

impl From<ApiReleaseDetail> for ReleaseDetail {
    fn from(api: ApiReleaseDetail) -> Self {
        ReleaseDetail {
            relations: api.relations.into_iter().map(Relation::from).collect(),
            media: api
                .media
                .into_iter()
                .map(|medium| Medium {
                    tracks: medium
                        .tracks
                        .into_iter()
                        .map(|track| Track {
                            recording_relations: track
                                .recording
                                .map(|recording| {
                                    recording.relations.into_iter().map(Relation::from).collect()
                                })
                                .unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Build the Lucene search expression: exact-quoted title and artist, plus a
/// date term when a year is given.
fn search_query(title: &str, artist: &str, year: Option<i32>) -> String {
    let mut terms = vec![
        format!("release:\"{}\"", escape_quotes(title)),
        format!("artist:\"{}\"", escape_quotes(artist)),
    ];
    if let Some(year) = year {
        terms.push(format!("date:{year}"));
    }
    terms.join(" AND ")
}

fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// MusicBrainz implementation of [`MetadataService`].
pub struct MusicBrainzClient {
    http: Client,
    base_url: String,
    limiter: Mutex<RateLimiter>,
    search_limit: u32,
}

impl MusicBrainzClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()
            .map_err(|source| ClientError::Http {
                endpoint: "client".to_string(),
                source,
            })?;

        Ok(MusicBrainzClient {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            limiter: Mutex::new(RateLimiter::from_millis(
                "musicbrainz",
                config.rate_limit_ms(),
            )),
            search_limit: config.search_limit(),
        })
    }

    /// One rate-limited GET, decoded from JSON.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.limiter.lock().await.acquire().await;

        let result = self.fetch(path, params).await;

        let mut limiter = self.limiter.lock().await;
        match &result {
            Ok(_) => limiter.report_success(),
            Err(_) => limiter.report_failure(),
        }
        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("fmt", "json")])
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ClientError::Http {
            endpoint: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl MetadataService for MusicBrainzClient {
    async fn search_release_groups(
        &self,
        title: &str,
        artist: &str,
        year: Option<i32>,
    ) -> Result<Vec<Candidate>, ClientError> {
        let response: GroupSearchResponse = self
            .get_json(
                "release-group",
                &[
                    ("query", search_query(title, artist, year)),
                    ("limit", self.search_limit.to_string()),
                ],
            )
            .await?;
        debug!(title, artist, hits = response.release_groups.len(), "release-group search");
        Ok(response.release_groups.into_iter().map(Candidate::from).collect())
    }

    async fn search_releases(
        &self,
        title: &str,
        artist: &str,
        year: Option<i32>,
    ) -> Result<Vec<Candidate>, ClientError> {
        let response: ReleaseSearchResponse = self
            .get_json(
                "release",
                &[
                    ("query", search_query(title, artist, year)),
                    ("limit", self.search_limit.to_string()),
                ],
            )
            .await?;
        debug!(title, artist, hits = response.releases.len(), "release search");
        Ok(response.releases.into_iter().map(Candidate::from).collect())
    }

    async fn group_releases(&self, group_id: &str) -> Result<Vec<GroupRelease>, ClientError> {
        let response: GroupDetailResponse = self
            .get_json(
                &format!("release-group/{group_id}"),
                &[("inc", "releases".to_string())],
            )
            .await?;
        Ok(response
            .releases
            .into_iter()
            .map(|release| GroupRelease {
                id: release.id,
                status: release.status,
            })
            .collect())
    }

    async fn release_detail(&self, release_id: &str) -> Result<ReleaseDetail, ClientError> {
        let response: ApiReleaseDetail = self
            .get_json(
                &format!("release/{release_id}"),
                &[("inc", RELATION_INC.to_string())],
            )
            .await?;
        Ok(response.into())
    }
}
