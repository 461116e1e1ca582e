//! Sample data for screen and CLI tests.

use audify_api_models::{OptimizeResponse, OptimizedTrack, TokenPair};
use audify_config::SpotifyConfig;

/// A well-formed Spotify playlist link.
pub const SAMPLE_PLAYLIST_LINK: &str = "https://open.spotify.com/playlist/abc";

/// Track at 1-based `position` with deterministic field values.
#[must_use]
pub fn sample_track(position: u32) -> OptimizedTrack {
    OptimizedTrack {
        position,
        track_name: format!("Track {position}"),
        artist: format!("Artist {position}"),
        album_name: format!("Album {position}"),
        album_cover: Some(format!("https://i.scdn.co/image/{position}")),
        tempo: 90.0 + f64::from(position),
        popularity: 40 + position,
        danceability: Some(0.5),
        uri: format!("spotify:track:{position}"),
    }
}

/// `count` tracks in ascending position order.
#[must_use]
pub fn sample_tracks(count: u32) -> Vec<OptimizedTrack> {
    (1..=count).map(sample_track).collect()
}

/// Optimize response holding `count` sample tracks.
#[must_use]
pub fn optimize_response(count: u32) -> OptimizeResponse {
    OptimizeResponse {
        optimal_playlist: sample_tracks(count),
    }
}

/// Token pair returned by the default fake exchange.
#[must_use]
pub fn sample_tokens() -> TokenPair {
    TokenPair {
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
    }
}

/// Spotify settings with a fixed client id and default endpoints.
///
/// # Panics
///
/// Never in practice; the client id is non-blank.
#[must_use]
pub fn spotify_settings() -> SpotifyConfig {
    SpotifyConfig::with_defaults("test-client").expect("fixture client id is non-blank")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tracks_are_ordered_and_distinct() {
        let tracks = sample_tracks(3);
        let positions: Vec<_> = tracks.iter().map(|track| track.position).collect();
        assert_eq!(positions, [1, 2, 3]);
        assert_ne!(tracks[0].uri, tracks[1].uri);
    }
}
