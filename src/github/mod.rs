use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

mod api;
mod client;
mod filter;

pub use api::*;
pub use client::GithubClientImpl;
pub use filter::*;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GithubClient {
    /// Fetch all branches of `repo`, owned by the repository owner.
    async fn get_branches(&self, repo: &str) -> Result<Vec<Branch>>;

    /// Fetch all versions of a package of the given type (e.g. `container`).
    async fn get_package_versions(
        &self,
        package_name: &str,
        package_type: &str,
    ) -> Result<Vec<PackageVersion>>;

    async fn delete_package_version(
        &self,
        package_name: &str,
        version: &PackageVersion,
    ) -> Result<()>;
}
