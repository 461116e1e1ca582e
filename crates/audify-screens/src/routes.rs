//! Routing shell: maps paths to screens.

use std::fmt;

/// Title of the landing screen.
pub const LANDING_TITLE: &str = "Audify";
/// Prompt shown under the landing title.
pub const LANDING_PROMPT: &str = "Click Audify to get started";

/// Screens reachable by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Landing,
    /// `/home`
    Home,
    /// `/options`
    Options,
    /// `/sim`
    Similarity,
    /// Anything else.
    NotFound,
}

/// Entry of the options menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    /// Button label.
    pub label: &'static str,
    /// Destination.
    pub route: Route,
}

/// Options menu, in display order.
pub const OPTIONS_MENU: [MenuEntry; 2] = [
    MenuEntry {
        label: "Playlist Optimizer",
        route: Route::Home,
    },
    MenuEntry {
        label: "Similarity Checker",
        route: Route::Similarity,
    },
];

impl Route {
    /// Resolve a path, ignoring any query string, fragment and trailing slash.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Landing,
            "/home" => Self::Home,
            "/options" => Self::Options,
            "/sim" => Self::Similarity,
            _ => Self::NotFound,
        }
    }

    /// Canonical path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Home => "/home",
            Self::Options => "/options",
            Self::Similarity => "/sim",
            Self::NotFound => "/404",
        }
    }

    /// Screen title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Landing | Self::Home | Self::Similarity => "Audify.",
            Self::Options => "Options",
            Self::NotFound => "Page not found",
        }
    }

    /// Where the landing screen's single control leads.
    #[must_use]
    pub const fn landing_target() -> Self {
        Self::Home
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_to_screens() {
        assert_eq!(Route::from_path("/"), Route::Landing);
        assert_eq!(Route::from_path(""), Route::Landing);
        assert_eq!(Route::from_path("/home"), Route::Home);
        assert_eq!(Route::from_path("/home/"), Route::Home);
        assert_eq!(Route::from_path("/home?code=XYZ"), Route::Home);
        assert_eq!(Route::from_path("/options"), Route::Options);
        assert_eq!(Route::from_path("/sim"), Route::Similarity);
        assert_eq!(Route::from_path("/similarity"), Route::NotFound);
        assert_eq!(Route::from_path("/HOME"), Route::NotFound);
    }

    #[test]
    fn canonical_paths_round_trip() {
        for route in [Route::Landing, Route::Home, Route::Options, Route::Similarity] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::NotFound.to_string(), "/404");
    }

    #[test]
    fn options_menu_lists_both_tools() {
        let routes: Vec<_> = OPTIONS_MENU.iter().map(|entry| entry.route).collect();
        assert_eq!(routes, [Route::Home, Route::Similarity]);
        assert_eq!(Route::landing_target(), Route::Home);
    }
}
