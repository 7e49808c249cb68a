//! Sign-in, sign-out and status.

use std::fmt::Write as _;

use cookmate_app::AppState;
use cookmate_app::routes::{RouteDecision, Screen};
use cookmate_core::Provider;

use super::CliError;

/// Sign in with a mocked provider.
pub async fn login(state: &AppState, provider: Provider) -> Result<String, CliError> {
    let user = state.auth().login(provider).await?;

    let mut out = format!(
        "Signed in as {} ({}).",
        user.label(),
        user.email.as_deref().unwrap_or("no email")
    );
    if state.route(Screen::Home.path()) == RouteDecision::Redirect(Screen::OnboardingDiet) {
        out.push_str("\nNext: run `cookmate onboard` to set up your preferences.");
    }
    Ok(out)
}

/// Sign out and forget preferences.
pub fn logout(state: &AppState) -> Result<String, CliError> {
    if state.auth().user().is_none() {
        return Err(CliError::NotSignedIn);
    }
    state.logout()?;
    Ok("Signed out. Preferences and onboarding progress were cleared.".to_string())
}

/// Session, onboarding and configuration overview.
pub fn status(state: &AppState) -> String {
    let mut out = String::new();
    match state.auth().user() {
        Some(user) => {
            let _ = writeln!(out, "User:        {} via {}", user.label(), user.provider.title());
        }
        None => {
            let _ = writeln!(out, "User:        not signed in");
        }
    }

    let prefs = state.preferences().snapshot();
    let _ = writeln!(
        out,
        "Onboarding:  {}",
        if prefs.onboarding_complete {
            "complete"
        } else {
            "not complete"
        }
    );

    let list = state.shopping_list().snapshot();
    let _ = writeln!(
        out,
        "Shopping:    {} to buy, {} done",
        list.pending().count(),
        list.completed().count()
    );

    let home = match state.route(Screen::Home.path()) {
        RouteDecision::Render(screen) | RouteDecision::Redirect(screen) => screen.path(),
        RouteDecision::Loading => "loading",
    };
    let _ = writeln!(out, "Start page:  {home}");

    for warning in state.warnings() {
        let _ = writeln!(out, "Warning: {warning}");
    }
    out.trim_end().to_string()
}
