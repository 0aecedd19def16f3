use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::{
    dto::{AuthResponse, SignupRequest},
    password::{hash_password, verify_password},
    repo_types::{Education, Profile, PublicUser, Role, User},
    session::SessionKeys,
};
use crate::db::next_id;
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn login(state: &AppState, email: &str, password: &str) -> Result<AuthResponse, AppError> {
    let email = email.trim();
    let Some(user) = User::find_by_email(&state.store, email)? else {
        warn!(email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(password, user.password_hash.as_deref())? {
        warn!(email, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let marker = SessionKeys::from_ref(state).start(&state.store, user.into())?;
    info!(user_id = marker.user.id, email = %marker.user.email, "user logged in");
    Ok(AuthResponse {
        token: marker.token,
        user: marker.user,
    })
}

pub fn signup(state: &AppState, req: SignupRequest) -> Result<AuthResponse, AppError> {
    let email = req.email.trim().to_string();
    let name = req.name.trim().to_string();
    let min_len = state.config.settings.min_password_length;

    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if req.password.chars().count() < min_len {
        return Err(AppError::Validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }

    let hash = hash_password(&req.password)?;
    let user = state.store.modify(|users: &mut Vec<User>| {
        if users.iter().any(|u| u.email == email) {
            warn!(email = %email, "email already registered");
            return Err(AppError::EmailTaken);
        }
        let user = User {
            id: next_id(users),
            email: email.clone(),
            password_hash: Some(hash),
            name,
            role: req.role,
            profile: req.profile,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    })?;
    info!(user_id = user.id, email = %user.email, "user registered");

    let marker = SessionKeys::from_ref(state).start(&state.store, user.into())?;
    Ok(AuthResponse {
        token: marker.token,
        user: marker.user,
    })
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    SessionKeys::from_ref(state).end(&state.store)?;
    info!("user logged out");
    Ok(())
}

pub fn current_user(state: &AppState) -> Result<Option<PublicUser>, AppError> {
    Ok(SessionKeys::from_ref(state).current(&state.store)?)
}

pub fn is_logged_in(state: &AppState) -> Result<bool, AppError> {
    Ok(current_user(state)?.is_some())
}

/// Logs in as a canned demo account for `role`, creating it on first use.
pub fn demo_login(state: &AppState, role: Role) -> Result<AuthResponse, AppError> {
    let template = demo_user(role);
    let user = state.store.modify(|users: &mut Vec<User>| {
        if let Some(existing) = users.iter().find(|u| u.email == template.email) {
            return Ok::<_, AppError>(existing.clone());
        }
        let user = User {
            id: next_id(users),
            created_at: OffsetDateTime::now_utc(),
            ..template
        };
        users.push(user.clone());
        info!(user_id = user.id, ?role, "demo user created");
        Ok(user)
    })?;

    let marker = SessionKeys::from_ref(state).start(&state.store, user.into())?;
    info!(user_id = marker.user.id, ?role, "demo login");
    Ok(AuthResponse {
        token: marker.token,
        user: marker.user,
    })
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn demo_user(role: Role) -> User {
    let (email, name, profile) = match role {
        Role::Freelancer => (
            "alex.kumar@demo.ethicalfreelance",
            "Alex Kumar",
            Profile {
                title: Some("Full Stack Developer".into()),
                rating: Some("5.0".into()),
                reviews: Some("24".into()),
                hourly_rate: Some("75".into()),
                project_rate: Some("1500".into()),
                skills: Some(strings(&["React", "Node.js", "Python", "AWS", "MongoDB", "Docker"])),
                education: Some(Education {
                    degree: "B.Tech in Computer Science".into(),
                    institution: "IIT Delhi".into(),
                    year: "2018".into(),
                }),
                ..Profile::default()
            },
        ),
        Role::Client => (
            "hiring@demo.techcorp",
            "Tech Corp",
            Profile {
                company: Some("Tech Corp".into()),
                industry: Some("Technology & Software".into()),
                rating: Some("4.9".into()),
                reviews: Some("56".into()),
                company_size: Some("100-500 employees".into()),
                location: Some("San Francisco, CA".into()),
                about: Some("Leading technology company seeking top talent".into()),
                ..Profile::default()
            },
        ),
    };
    User {
        id: 0,
        email: email.into(),
        password_hash: None,
        name: name.into(),
        role,
        profile,
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}
