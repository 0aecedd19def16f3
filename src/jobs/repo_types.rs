use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::{Collection, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Development,
    Design,
    Marketing,
    Writing,
    Support,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Development,
        Category::Design,
        Category::Marketing,
        Category::Writing,
        Category::Support,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Development => "Development",
            Category::Design => "Design",
            Category::Marketing => "Marketing",
            Category::Writing => "Writing",
            Category::Support => "Support",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub category: Category,
    pub rate: String, // free text, e.g. "$80-120/hr"
    pub location: String,
    pub description: String,
    pub skills: Vec<String>,
    pub posted_by: String, // author email, "demo" for seed jobs
    #[serde(with = "time::serde::rfc3339")]
    pub posted_at: OffsetDateTime,
}

impl Record for Job {
    const COLLECTION: Collection = Collection::Jobs;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
}

impl Record for Application {
    const COLLECTION: Collection = Collection::Applications;

    fn id(&self) -> i64 {
        self.id
    }
}
