//! Playlist link validation.

use std::fmt;

use audify_config::LinkPolicy;
use thiserror::Error;
use url::Url;

/// Prefix required by [`LinkPolicy::Spotify`].
pub const SPOTIFY_LINK_PREFIX: &str = "https://open.spotify.com/";

/// Reasons a playlist link is rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Nothing was entered.
    #[error("a playlist link is required")]
    Empty,
    /// The input does not parse as an absolute URL.
    #[error("'{input}' is not a valid URL")]
    Malformed {
        /// Rejected input.
        input: String,
    },
    /// The URL is not an `open.spotify.com` link.
    #[error("playlist links must start with {SPOTIFY_LINK_PREFIX}")]
    NotSpotify,
}

/// A playlist link that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistLink {
    raw: String,
    url: Url,
}

impl PlaylistLink {
    /// Validate `input` under `policy`. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the input is empty, not a URL, or violates
    /// the Spotify prefix policy.
    pub fn parse(input: &str, policy: LinkPolicy) -> Result<Self, LinkError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(LinkError::Empty);
        }
        let url = Url::parse(raw).map_err(|_| LinkError::Malformed {
            input: raw.to_string(),
        })?;
        if policy == LinkPolicy::Spotify && !raw.starts_with(SPOTIFY_LINK_PREFIX) {
            return Err(LinkError::NotSpotify);
        }
        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    /// The link as entered (trimmed); this is what the backend receives.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form of the link.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Playlist id for write-back: the last non-empty path segment.
    ///
    /// `https://open.spotify.com/playlist/abc?si=x` yields `abc`.
    #[must_use]
    pub fn playlist_id(&self) -> Option<&str> {
        self.url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .next_back()
    }
}

impl fmt::Display for PlaylistLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
