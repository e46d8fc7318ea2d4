//! Album personnel credit resolution against the MusicBrainz web service.
//!
//! Given catalog metadata (title, artist, optional year), the pipeline
//! resolves a best-matching release, picks the edition with the richest
//! relationship data, and flattens its relations into deduplicated
//! (role, contributor) credits:
//!
//! 1. [`resolver`] — cascading release-group/release search
//! 2. [`selector`] — representative release within a group
//! 3. [`extractor`] — credit extraction and dedup
//!
//! [`CreditsPipeline`] ties the stages together behind an injected
//! [`MetadataService`] and never fails: upstream errors degrade to an empty
//! credit list with provenance preserved.

pub mod config;
pub mod error;
pub mod extractor;
pub mod musicbrainz;
pub mod normalize;
pub mod pipeline;
pub mod rate_limiter;
pub mod resolver;
pub mod score;
pub mod selector;
pub mod service;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use extractor::{Credit, CreditScope, CreditsResult};
pub use musicbrainz::MusicBrainzClient;
pub use pipeline::CreditsPipeline;
pub use service::{AlbumQuery, Candidate, MetadataService, ResolvedTarget};
