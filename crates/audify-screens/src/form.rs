//! Controlled playlist input form.

use audify_config::LinkPolicy;

use crate::link::{LinkError, PlaylistLink};

/// Placeholder shown in the empty input.
pub const LINK_PLACEHOLDER: &str = "Playlist Link";
/// Label of the submit control.
pub const SUBMIT_LABEL: &str = "Optimize";

/// Text input holding the playlist link, validated on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistForm {
    link: String,
    policy: LinkPolicy,
}

impl PlaylistForm {
    /// Empty form validating under `policy`.
    #[must_use]
    pub const fn new(policy: LinkPolicy) -> Self {
        Self {
            link: String::new(),
            policy,
        }
    }

    /// Current input text.
    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Validation policy in effect.
    #[must_use]
    pub const fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Replace the input text.
    pub fn set_link(&mut self, value: impl Into<String>) {
        self.link = value.into();
    }

    /// Clear the input.
    pub fn clear(&mut self) {
        self.link.clear();
    }

    /// Validate the current input.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the input is not an acceptable link.
    pub fn validate(&self) -> Result<PlaylistLink, LinkError> {
        PlaylistLink::parse(&self.link, self.policy)
    }

    /// Whether the submit control should be enabled for the current input.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }
}
