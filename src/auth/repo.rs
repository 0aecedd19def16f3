use crate::auth::repo_types::User;
use crate::db::{Store, StoreError};

impl User {
    /// Exact, case-sensitive email lookup.
    pub fn find_by_email(store: &Store, email: &str) -> Result<Option<User>, StoreError> {
        store.find_by(|u: &User| u.email == email)
    }

    pub fn find(store: &Store, id: i64) -> Result<Option<User>, StoreError> {
        store.find_by_id(id)
    }
}
