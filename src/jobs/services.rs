use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::session::SessionKeys;
use crate::db::next_id;
use crate::error::AppError;
use crate::jobs::{
    dto::{CreateJobRequest, JobFilters, JobPage},
    repo_types::{Application, Job},
};
use crate::state::AppState;

fn matches(job: &Job, category: Option<&str>, needle: Option<&str>) -> bool {
    if let Some(category) = category {
        if job.category.as_str() != category {
            return false;
        }
    }
    let Some(needle) = needle else {
        return true;
    };
    job.title.to_lowercase().contains(needle)
        || job.company.to_lowercase().contains(needle)
        || job.skills.iter().any(|s| s.to_lowercase().contains(needle))
}

pub fn list(state: &AppState, filters: &JobFilters) -> Result<JobPage, AppError> {
    let category = filters
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "all");
    let needle = filters
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let jobs: Vec<Job> = state
        .store
        .get_all::<Job>()?
        .unwrap_or_default()
        .into_iter()
        .filter(|job| matches(job, category, needle.as_deref()))
        .collect();
    let total = jobs.len();
    let per_page = state.config.settings.jobs_per_page;

    let jobs = match filters.page {
        Some(page) => jobs
            .into_iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .collect(),
        None => jobs,
    };
    Ok(JobPage {
        jobs,
        total,
        page: filters.page,
        per_page,
    })
}

pub fn get(state: &AppState, id: i64) -> Result<Job, AppError> {
    state
        .store
        .find_by_id::<Job>(id)?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))
}

pub fn create(state: &AppState, req: CreateJobRequest) -> Result<Job, AppError> {
    let user = SessionKeys::from_ref(state).require(&state.store, "post jobs")?;

    let title = req.title.trim().to_string();
    let company = req.company.trim().to_string();
    let description = req.description.trim().to_string();
    if title.is_empty() || company.is_empty() || description.is_empty() {
        return Err(AppError::Validation(
            "Title, company and description are required".into(),
        ));
    }

    let job = state.store.modify(|jobs: &mut Vec<Job>| {
        let job = Job {
            id: next_id(jobs),
            title,
            company,
            category: req.category,
            rate: req.rate.trim().to_string(),
            location: req.location.trim().to_string(),
            description,
            skills: req
                .skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            posted_by: user.email.clone(),
            posted_at: OffsetDateTime::now_utc(),
        };
        jobs.push(job.clone());
        Ok::<_, AppError>(job)
    })?;
    info!(job_id = job.id, posted_by = %job.posted_by, category = %job.category, "job posted");
    Ok(job)
}

pub fn apply(state: &AppState, job_id: i64) -> Result<Application, AppError> {
    let user = SessionKeys::from_ref(state).require(&state.store, "apply")?;
    get(state, job_id)?;

    let application = state.store.modify(|apps: &mut Vec<Application>| {
        if apps.iter().any(|a| a.job_id == job_id && a.user_id == user.id) {
            warn!(job_id, user_id = user.id, "duplicate application");
            return Err(AppError::AlreadyApplied);
        }
        let application = Application {
            id: next_id(apps),
            job_id,
            user_id: user.id,
            applied_at: OffsetDateTime::now_utc(),
        };
        apps.push(application.clone());
        Ok(application)
    })?;
    info!(application_id = application.id, job_id, user_id = user.id, "application submitted");
    Ok(application)
}

pub fn my_applications(state: &AppState) -> Result<Vec<Application>, AppError> {
    let user = SessionKeys::from_ref(state).require(&state.store, "view applications")?;
    Ok(state
        .store
        .get_all::<Application>()?
        .unwrap_or_default()
        .into_iter()
        .filter(|a| a.user_id == user.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        dto::SignupRequest,
        repo_types::{Profile, Role},
        services::{logout, signup},
    };
    use crate::jobs::repo_types::Category;

    fn logged_in_state(email: &str) -> AppState {
        let state = AppState::fake();
        sign_in(&state, email);
        state
    }

    fn sign_in(state: &AppState, email: &str) {
        signup(
            state,
            SignupRequest {
                email: email.into(),
                password: "secret1".into(),
                name: "Robin".into(),
                role: Role::Client,
                profile: Profile::default(),
            },
        )
        .unwrap();
    }

    fn filters(category: Option<&str>, search: Option<&str>) -> JobFilters {
        JobFilters {
            category: category.map(Into::into),
            search: search.map(Into::into),
            page: None,
        }
    }

    fn new_job(title: &str) -> CreateJobRequest {
        CreateJobRequest {
            title: title.into(),
            company: "Acme".into(),
            category: Category::Support,
            rate: "$30/hr".into(),
            location: "Lisbon".into(),
            description: "Answer tickets".into(),
            skills: vec!["Zendesk".into(), " ".into()],
        }
    }

    #[test]
    fn unfiltered_list_returns_the_four_seed_jobs() {
        let state = AppState::fake();
        let page = list(&state, &JobFilters::default()).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.jobs.len(), 4);
        assert_eq!(list(&state, &filters(Some("all"), None)).unwrap().total, 4);
    }

    #[test]
    fn category_filter_is_exact() {
        let state = AppState::fake();
        let page = list(&state, &filters(Some("Design"), None)).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.jobs.iter().all(|j| j.category == Category::Design));
        assert_eq!(list(&state, &filters(Some("design"), None)).unwrap().total, 0);
        assert_eq!(list(&state, &filters(Some("Support"), None)).unwrap().total, 0);
    }

    #[test]
    fn search_is_case_insensitive_over_title_company_and_skills() {
        let state = AppState::fake();
        let by_skill = list(&state, &filters(None, Some("react"))).unwrap();
        assert_eq!(by_skill.total, 1);
        assert_eq!(by_skill.jobs[0].title, "Senior Frontend Developer");

        let by_company = list(&state, &filters(None, Some("GROWTH"))).unwrap();
        assert_eq!(by_company.jobs[0].id, 4);

        let by_title = list(&state, &filters(None, Some("writer"))).unwrap();
        assert_eq!(by_title.jobs[0].id, 3);

        assert_eq!(list(&state, &filters(None, Some("ads"))).unwrap().total, 1);
        assert_eq!(list(&state, &filters(None, Some("cobol"))).unwrap().total, 0);
    }

    #[test]
    fn filters_combine() {
        let state = AppState::fake();
        assert_eq!(list(&state, &filters(Some("Design"), Some("figma"))).unwrap().total, 1);
        assert_eq!(list(&state, &filters(Some("Writing"), Some("figma"))).unwrap().total, 0);
    }

    #[test]
    fn pages_slice_the_filtered_list() {
        let state = logged_in_state("poster@example.com");
        for n in 0..8 {
            create(&state, new_job(&format!("Support agent {n}"))).unwrap();
        }
        let first = list(&state, &JobFilters { page: Some(0), ..JobFilters::default() }).unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.jobs.len(), 10);
        let second = list(&state, &JobFilters { page: Some(1), ..JobFilters::default() }).unwrap();
        assert_eq!(second.jobs.len(), 2);
        let beyond = list(&state, &JobFilters { page: Some(5), ..JobFilters::default() }).unwrap();
        assert!(beyond.jobs.is_empty());
    }

    #[test]
    fn create_requires_a_session_and_leaves_jobs_untouched() {
        let state = AppState::fake();
        let before = state.store.get_all::<Job>().unwrap();
        let err = create(&state, new_job("Night shift")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Must be logged in to post jobs");
        assert_eq!(state.store.get_all::<Job>().unwrap(), before);
    }

    #[test]
    fn create_stamps_author_and_appends() {
        let state = logged_in_state("poster@example.com");
        let job = create(&state, new_job("Night shift")).unwrap();
        assert_eq!(job.posted_by, "poster@example.com");
        assert_eq!(job.skills, vec!["Zendesk".to_string()]);
        assert_eq!(get(&state, job.id).unwrap(), job);
        assert_eq!(list(&state, &JobFilters::default()).unwrap().total, 5);
    }

    #[test]
    fn create_rejects_missing_fields() {
        let state = logged_in_state("poster@example.com");
        let mut req = new_job("  ");
        req.description = String::new();
        assert!(matches!(create(&state, req), Err(AppError::Validation(_))));
        assert_eq!(list(&state, &JobFilters::default()).unwrap().total, 4);
    }

    #[test]
    fn applying_twice_keeps_one_application() {
        let state = logged_in_state("applicant@example.com");
        let first = apply(&state, 1).unwrap();
        assert_eq!(first.job_id, 1);

        let err = apply(&state, 1).unwrap_err();
        assert!(matches!(err, AppError::AlreadyApplied));
        assert_eq!(state.store.get_all::<Application>().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn different_users_may_apply_to_the_same_job() {
        let state = logged_in_state("one@example.com");
        apply(&state, 2).unwrap();
        sign_in(&state, "two@example.com");
        apply(&state, 2).unwrap();
        assert_eq!(state.store.get_all::<Application>().unwrap().unwrap().len(), 2);
        assert_eq!(my_applications(&state).unwrap().len(), 1);
    }

    #[test]
    fn apply_requires_session_and_existing_job() {
        let state = AppState::fake();
        assert!(matches!(apply(&state, 1), Err(AppError::Unauthorized("apply"))));

        sign_in(&state, "applicant@example.com");
        assert!(matches!(apply(&state, 404), Err(AppError::NotFound(_))));
        assert!(state.store.get_all::<Application>().unwrap().unwrap().is_empty());
    }

    #[test]
    fn my_applications_requires_session() {
        let state = logged_in_state("applicant@example.com");
        apply(&state, 3).unwrap();
        assert_eq!(my_applications(&state).unwrap()[0].job_id, 3);
        logout(&state).unwrap();
        assert!(matches!(my_applications(&state), Err(AppError::Unauthorized(_))));
    }
}
