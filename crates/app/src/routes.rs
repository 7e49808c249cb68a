//! Navigation gate.
//!
//! Decides what a requested path shows given the session and onboarding
//! state. Rendering itself is left to the front end.

use core::fmt;

use crate::services::auth::AuthState;
use crate::services::preferences::PreferencesState;

/// Every routable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    OnboardingDiet,
    OnboardingKitchen,
    OnboardingProfile,
    Home,
    Cookbook,
    ShoppingList,
    Settings,
    AddUsers,
    Pantry,
}

impl Screen {
    pub const ALL: &'static [Self] = &[
        Self::Login,
        Self::OnboardingDiet,
        Self::OnboardingKitchen,
        Self::OnboardingProfile,
        Self::Home,
        Self::Cookbook,
        Self::ShoppingList,
        Self::Settings,
        Self::AddUsers,
        Self::Pantry,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::OnboardingDiet => "/onboarding/diet",
            Self::OnboardingKitchen => "/onboarding/kitchen",
            Self::OnboardingProfile => "/onboarding/profile",
            Self::Home => "/",
            Self::Cookbook => "/cookbook",
            Self::ShoppingList => "/shopping-list",
            Self::Settings => "/settings",
            Self::AddUsers => "/add-users",
            Self::Pantry => "/pantry",
        }
    }

    /// Screen for `path`, ignoring a trailing slash.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.iter().copied().find(|s| s.path() == normalized)
    }

    #[must_use]
    pub const fn is_onboarding(self) -> bool {
        matches!(
            self,
            Self::OnboardingDiet | Self::OnboardingKitchen | Self::OnboardingProfile
        )
    }

    /// Screens reachable once onboarding is complete.
    #[must_use]
    pub const fn is_main(self) -> bool {
        !matches!(self, Self::Login) && !self.is_onboarding()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// A service is still restoring state.
    Loading,
    Render(Screen),
    Redirect(Screen),
}

/// Resolve `path` against the current session and onboarding state.
#[must_use]
pub fn resolve(path: &str, auth: &AuthState, preferences: &PreferencesState) -> RouteDecision {
    if auth.loading || preferences.loading {
        return RouteDecision::Loading;
    }

    let requested = Screen::from_path(path);
    let (allowed, fallback) = if !auth.is_authenticated() {
        (requested == Some(Screen::Login), Screen::Login)
    } else if !preferences.onboarding_complete {
        (requested.is_some_and(Screen::is_onboarding), Screen::OnboardingDiet)
    } else {
        (requested.is_some_and(Screen::is_main), Screen::Home)
    };

    match requested {
        Some(screen) if allowed => RouteDecision::Render(screen),
        _ => RouteDecision::Redirect(fallback),
    }
}

/// Whether the bottom navigation bar is shown.
#[must_use]
pub const fn shows_navigation(auth: &AuthState, preferences: &PreferencesState) -> bool {
    auth.is_authenticated() && preferences.onboarding_complete && !auth.loading
}
