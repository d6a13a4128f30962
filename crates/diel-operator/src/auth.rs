//! Bearer-token authorization for mutating operator routes.
//!
//! Read-only routes are always open. Mutating routes require an
//! `Authorization: Bearer <token>` header matching the configured
//! operator token; an empty configured token disables the check, which
//! suits local development and tests.

use axum::http::{HeaderMap, header};

use crate::error::OperatorApiError;
use crate::state::AppState;

/// Check the bearer token on a mutating request.
///
/// # Errors
///
/// Returns [`OperatorApiError::PermissionDenied`] when a token is
/// configured and the request does not carry a matching bearer token.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), OperatorApiError> {
    if state.auth_token.is_empty() {
        return Ok(());
    }

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if presented == Some(state.auth_token.as_str()) {
        Ok(())
    } else {
        Err(OperatorApiError::PermissionDenied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use diel_core::config::{ConfigSource, CycleConfig};
    use diel_core::reload::{ReloadController, SchedulerSlot};
    use diel_core::runner::DriverControl;
    use diel_host::HostWorlds;
    use tokio::sync::RwLock;

    use super::*;

    fn state_with_token(token: &str) -> AppState {
        let slot = Arc::new(SchedulerSlot::new());
        let controller = Arc::new(ReloadController::new(
            slot,
            ConfigSource::Fixed(CycleConfig::default()),
        ));
        AppState::new(
            Arc::new(RwLock::new(HostWorlds::new())),
            controller,
            Arc::new(DriverControl::new()),
            token.to_owned(),
        )
    }

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn empty_configured_token_allows_everything() {
        let state = state_with_token("");
        assert!(authorize(&state, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn matching_bearer_token_is_accepted() {
        let state = state_with_token("secret");
        let headers = headers_with_auth("Bearer secret");
        assert!(authorize(&state, &headers).is_ok());
    }

    #[test]
    fn token_is_trimmed_before_comparison() {
        let state = state_with_token("secret");
        let headers = headers_with_auth("Bearer secret ");
        assert!(authorize(&state, &headers).is_ok());
    }

    #[test]
    fn missing_header_is_denied() {
        let state = state_with_token("secret");
        let err = authorize(&state, &HeaderMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You do not have permission to use this command."
        );
    }

    #[test]
    fn wrong_token_is_denied() {
        let state = state_with_token("secret");
        let headers = headers_with_auth("Bearer other");
        assert!(authorize(&state, &headers).is_err());
    }

    #[test]
    fn non_bearer_scheme_is_denied() {
        let state = state_with_token("secret");
        let headers = headers_with_auth("Basic secret");
        assert!(authorize(&state, &headers).is_err());
    }
}
