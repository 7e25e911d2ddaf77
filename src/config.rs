use anyhow::{Context, Result};
use std::env;

/// Owner for which packages are looked up under the organization endpoints.
pub const KNOWN_ORGANIZATION: &str = "paperless-ngx";

/// Repository whose branches decide which images are still alive.
pub const TRACKED_REPOSITORY: &str = "paperless-ngx";

pub const FEATURE_BRANCH_PREFIX: &str = "feature-";

pub const PACKAGE_NAMES: [&str; 2] = ["paperless-ngx", "paperless-ngx/builder/cache/app"];

pub const PACKAGE_TYPE: &str = "container";

pub const REPOSITORY_OWNER_VAR: &str = "GITHUB_REPOSITORY_OWNER";
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
pub const TOKEN_VAR: &str = "TOKEN";

/// Settings provided by the CI environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub repository_owner: String,
    pub repository: String,
    pub token: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key).context(format!("Required environment variable {} is not set", key))
        };

        Ok(Self {
            repository_owner: require(REPOSITORY_OWNER_VAR)?,
            repository: require(REPOSITORY_VAR)?,
            token: require(TOKEN_VAR)?,
        })
    }
}

// Keep the token out of debug logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("repository_owner", &self.repository_owner)
            .field("repository", &self.repository)
            .field("token", &"***")
            .finish()
    }
}
