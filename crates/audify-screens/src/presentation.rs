//! View models for the result table, dialogs and loading overlay.
//!
//! These are plain data built from screen snapshots; front ends decide how to
//! draw them.

use audify_api_models::OptimizedTrack;

use crate::home::{HomeFailure, HomeView};

/// Title of the result view.
pub const RESULT_TITLE: &str = "Optimized Playlist Order";
/// Column headings of the result table.
pub const RESULT_COLUMNS: [&str; 7] = [
    "#",
    "Art",
    "Track Name",
    "Artist",
    "Album Name",
    "Tempo (BPM)",
    "Popularity",
];
/// Label of the write-back action.
pub const MODIFY_ACTION_LABEL: &str = "Modify current playlist ordering";
/// Label of every dismiss control.
pub const CLOSE_LABEL: &str = "Close";
/// Label of the loading overlay's cancel control.
pub const CANCEL_LABEL: &str = "X";

/// One rendered track.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// 1-based display index (array position + 1).
    pub index: usize,
    /// Album art URL.
    pub album_cover: Option<String>,
    /// Track title.
    pub track_name: String,
    /// Artist name.
    pub artist: String,
    /// Album title; doubles as the art's alt text.
    pub album_name: String,
    /// Tempo in BPM.
    pub tempo: f64,
    /// Popularity score.
    pub popularity: u32,
}

impl ResultRow {
    /// Cell texts in [`RESULT_COLUMNS`] order.
    #[must_use]
    pub fn cells(&self) -> [String; 7] {
        [
            self.index.to_string(),
            self.album_cover.clone().unwrap_or_default(),
            self.track_name.clone(),
            self.artist.clone(),
            self.album_name.clone(),
            format_tempo(self.tempo),
            self.popularity.to_string(),
        ]
    }
}

fn format_tempo(tempo: f64) -> String {
    let rounded = (tempo * 1_000.0).round() / 1_000.0;
    rounded.to_string()
}

/// The optimized playlist table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// Heading.
    pub title: &'static str,
    /// Rows in backend order.
    pub rows: Vec<ResultRow>,
    /// Whether the write-back action is offered.
    pub can_modify: bool,
}

impl ResultTable {
    /// Build the table for `tracks`; the write-back action needs a login.
    #[must_use]
    pub fn build(tracks: &[OptimizedTrack], logged_in: bool) -> Self {
        let rows = tracks
            .iter()
            .enumerate()
            .map(|(position, track)| ResultRow {
                index: position + 1,
                album_cover: track.album_cover.clone(),
                track_name: track.track_name.clone(),
                artist: track.artist.clone(),
                album_name: track.album_name.clone(),
                tempo: track.tempo,
                popularity: track.popularity,
            })
            .collect();
        Self {
            title: RESULT_TITLE,
            rows,
            can_modify: logged_in,
        }
    }

    /// Table for the screen's current result, if the result view is open.
    #[must_use]
    pub fn from_view(view: &HomeView, logged_in: bool) -> Option<Self> {
        view.result_open()
            .then(|| Self::build(&view.tracks, logged_in))
    }
}

/// Error dialog contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    /// Heading.
    pub title: &'static str,
    /// Fixed apology.
    pub text: &'static str,
    /// What went wrong, when known.
    pub detail: Option<String>,
}

impl ErrorDialog {
    /// Heading of the error dialog.
    pub const TITLE: &'static str = "Error";
    /// Body of the error dialog.
    pub const TEXT: &'static str =
        "Oops! An error occurred while processing your request. Please try again later.";

    /// Dialog with an optional detail line.
    #[must_use]
    pub const fn new(detail: Option<String>) -> Self {
        Self {
            title: Self::TITLE,
            text: Self::TEXT,
            detail,
        }
    }

    /// Dialog describing `failure`.
    #[must_use]
    pub fn from_failure(failure: &HomeFailure) -> Self {
        let detail = failure.detail();
        Self::new((!detail.is_empty()).then_some(detail))
    }

    /// Dialog for the screen's current failure, if the error dialog is open.
    #[must_use]
    pub fn from_view(view: &HomeView) -> Option<Self> {
        view.failure().map(Self::from_failure)
    }
}

/// Information dialog contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoDialog {
    /// Heading.
    pub title: &'static str,
    /// Explanatory paragraphs.
    pub paragraphs: &'static [&'static str],
    /// Source link label.
    pub link_label: &'static str,
    /// Source link target.
    pub link_url: &'static str,
}

const INFO_PARAGRAPHS: [&str; 4] = [
    "This application connects with your Spotify account and helps enhance your playlists.",
    "It does this by looking at various details of your songs, such as how fast or slow they \
     are, the musical key they're in, and their genres. Using this information, the application \
     groups similar songs together and figures out the best sequence for your playlist, aiming \
     to make transitions between songs feel as smooth as possible.",
    "Once it's found the optimal order for your playlist, it adjusts the order of your playlist \
     directly in your Spotify account. You don't have to do anything - just sit back and enjoy \
     your new and improved playlist!",
    "To use this service, you'll need to give it permission to interact with your Spotify \
     account. This is all done securely through Spotify's own systems - the app never sees your \
     login information. The result? A better organized playlist for your enjoyment.",
];

impl InfoDialog {
    /// The static information dialog.
    pub const CONTENT: Self = Self {
        title: "Information",
        paragraphs: &INFO_PARAGRAPHS,
        link_label: "Click here to view the code on GitHub",
        link_url: "https://github.com/manav-s/audify",
    };
}

impl Default for InfoDialog {
    fn default() -> Self {
        Self::CONTENT
    }
}

/// Loading overlay contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingOverlay {
    /// Current status phrase.
    pub phrase: &'static str,
    /// Label of the cancel control.
    pub cancel_label: &'static str,
}

impl LoadingOverlay {
    /// Overlay for the screen, present only while loading.
    #[must_use]
    pub fn from_view(view: &HomeView) -> Option<Self> {
        if !view.is_loading() {
            return None;
        }
        Some(Self {
            phrase: view.loading_phrase.unwrap_or_default(),
            cancel_label: CANCEL_LABEL,
        })
    }
}

#[cfg(test)]
mod tests {
    use audify_test_support::fixtures::sample_tracks;

    use super::*;
    use crate::home::HomePhase;
    use crate::link::LinkError;

    #[test]
    fn rows_follow_array_order_not_server_position() {
        let mut tracks = sample_tracks(3);
        tracks.reverse();
        let table = ResultTable::build(&tracks, false);

        let indices: Vec<_> = table.rows.iter().map(|row| row.index).collect();
        let names: Vec<_> = table.rows.iter().map(|row| row.track_name.as_str()).collect();
        assert_eq!(indices, [1, 2, 3]);
        assert_eq!(names, ["Track 3", "Track 2", "Track 1"]);
        assert!(!table.can_modify);
        assert_eq!(table.title, RESULT_TITLE);
    }

    #[test]
    fn cells_line_up_with_columns() {
        let table = ResultTable::build(&sample_tracks(1), true);
        let cells = table.rows[0].cells();
        assert_eq!(cells.len(), RESULT_COLUMNS.len());
        assert_eq!(cells[0], "1");
        assert_eq!(cells[2], "Track 1");
        assert_eq!(cells[5], "91");
        assert_eq!(cells[6], "41");
        assert!(table.can_modify);
    }

    #[test]
    fn overlay_and_dialogs_follow_phase() {
        let mut view = HomeView::default();
        assert!(LoadingOverlay::from_view(&view).is_none());
        assert!(ErrorDialog::from_view(&view).is_none());
        assert!(ResultTable::from_view(&view, true).is_none());

        view.phase = HomePhase::Loading;
        view.loading_phrase = Some("Analyzing the vibe...");
        let overlay = LoadingOverlay::from_view(&view).expect("overlay while loading");
        assert_eq!(overlay.phrase, "Analyzing the vibe...");
        assert_eq!(overlay.cancel_label, CANCEL_LABEL);

        view.phase = HomePhase::Error(HomeFailure::Validation(LinkError::Empty));
        let dialog = ErrorDialog::from_view(&view).expect("dialog on error");
        assert_eq!(dialog.title, "Error");
        assert_eq!(dialog.detail.as_deref(), Some("a playlist link is required"));
    }

    #[test]
    fn info_dialog_links_to_source() {
        let info = InfoDialog::default();
        assert_eq!(info.title, "Information");
        assert_eq!(info.paragraphs.len(), 4);
        assert_eq!(info.link_url, "https://github.com/manav-s/audify");
    }
}
