use axum::extract::FromRef;
use tracing::info;

use crate::auth::{
    repo_types::{PublicUser, User},
    session::SessionKeys,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::users::dto::ProfilePatch;

/// The logged-in user as currently stored, not as cached in the session.
pub fn profile(state: &AppState) -> Result<PublicUser, AppError> {
    let me = SessionKeys::from_ref(state).require(&state.store, "view your profile")?;
    let user = User::find(&state.store, me.id)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(user.into())
}

pub fn update_profile(state: &AppState, patch: ProfilePatch) -> Result<PublicUser, AppError> {
    let keys = SessionKeys::from_ref(state);
    let me = keys.require(&state.store, "update your profile")?;

    if patch.is_empty() {
        return Err(AppError::Validation("Nothing to update".into()));
    }
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Name is required".into()));
    }

    let fields = serde_json::to_value(&patch).map_err(anyhow::Error::from)?;
    let updated: User = state
        .store
        .update(me.id, &fields)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let public = PublicUser::from(updated);
    keys.refresh_user(&state.store, public.clone())?;
    info!(user_id = public.id, "profile updated");
    Ok(public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        dto::SignupRequest,
        repo_types::{Profile, Role},
        services::{current_user, login, logout, signup},
    };

    fn signed_up(state: &AppState) -> PublicUser {
        signup(
            state,
            SignupRequest {
                email: "kim@example.com".into(),
                password: "secret1".into(),
                name: "Kim".into(),
                role: Role::Freelancer,
                profile: Profile {
                    title: Some("Illustrator".into()),
                    ..Profile::default()
                },
            },
        )
        .unwrap()
        .user
    }

    #[test]
    fn profile_requires_session() {
        let state = AppState::fake();
        assert!(matches!(profile(&state), Err(AppError::Unauthorized(_))));
        let me = signed_up(&state);
        assert_eq!(profile(&state).unwrap(), me);
    }

    #[test]
    fn update_merges_fields_and_refreshes_session() {
        let state = AppState::fake();
        let me = signed_up(&state);

        let patch = ProfilePatch {
            name: None,
            profile: Profile {
                hourly_rate: Some("90".into()),
                skills: Some(vec!["Procreate".into()]),
                ..Profile::default()
            },
        };
        let updated = update_profile(&state, patch).unwrap();
        assert_eq!(updated.id, me.id);
        assert_eq!(updated.email, me.email);
        assert_eq!(updated.profile.title.as_deref(), Some("Illustrator"));
        assert_eq!(updated.profile.hourly_rate.as_deref(), Some("90"));
        assert_eq!(current_user(&state).unwrap().unwrap(), updated);

        // credentials survive the merge
        logout(&state).unwrap();
        assert!(login(&state, "kim@example.com", "secret1").is_ok());
    }

    #[test]
    fn update_renames() {
        let state = AppState::fake();
        signed_up(&state);
        let updated = update_profile(
            &state,
            ProfilePatch {
                name: Some("Kim Park".into()),
                ..ProfilePatch::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Kim Park");
        assert_eq!(profile(&state).unwrap().name, "Kim Park");
    }

    #[test]
    fn update_rejects_empty_or_blank_patches() {
        let state = AppState::fake();
        signed_up(&state);
        assert!(matches!(
            update_profile(&state, ProfilePatch::default()),
            Err(AppError::Validation(_))
        ));
        let blank = ProfilePatch {
            name: Some(" ".into()),
            ..ProfilePatch::default()
        };
        assert!(matches!(update_profile(&state, blank), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_requires_session() {
        let state = AppState::fake();
        let patch = ProfilePatch {
            name: Some("x".into()),
            ..ProfilePatch::default()
        };
        assert!(matches!(update_profile(&state, patch), Err(AppError::Unauthorized(_))));
    }
}
