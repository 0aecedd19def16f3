use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Profile;

/// Fields a user may change on their own record. Identity fields (id, email,
/// password, role) are not part of it.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.profile.is_empty()
    }
}
