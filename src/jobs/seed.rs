use time::OffsetDateTime;

use super::repo_types::{Category, Job};

/// Jobs written into an empty board on first run.
pub fn default_jobs() -> Vec<Job> {
    let now = OffsetDateTime::now_utc();
    let job = |id, title: &str, company: &str, category, rate: &str, skills: [&str; 3], description: &str| Job {
        id,
        title: title.into(),
        company: company.into(),
        category,
        rate: rate.into(),
        location: "Remote".into(),
        description: description.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        posted_by: "demo".into(),
        posted_at: now,
    };

    vec![
        job(
            1,
            "Senior Frontend Developer",
            "TechCorp",
            Category::Development,
            "$80-120/hr",
            ["React", "TypeScript", "CSS"],
            "Build modern web applications",
        ),
        job(
            2,
            "UI/UX Designer",
            "DesignHub",
            Category::Design,
            "$60-90/hr",
            ["Figma", "Adobe XD", "Prototyping"],
            "Create beautiful user interfaces",
        ),
        job(
            3,
            "Content Writer",
            "MediaWorks",
            Category::Writing,
            "$40-60/hr",
            ["SEO", "Copywriting", "Research"],
            "Write engaging blog posts and articles",
        ),
        job(
            4,
            "Digital Marketing Specialist",
            "GrowthLabs",
            Category::Marketing,
            "$50-80/hr",
            ["Google Ads", "Facebook Ads", "Analytics"],
            "Drive growth through digital campaigns",
        ),
    ]
}
