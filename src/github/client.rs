use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Display;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, LINK, USER_AGENT},
    Client, ClientBuilder, Method, RequestBuilder, StatusCode,
};

use super::{Branch, GithubClient, PackageVersion};
use crate::config::KNOWN_ORGANIZATION;

pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOwner {
    /// Packages owned by an organization
    Organization(String),
    /// Packages owned by whoever the token belongs to
    AuthenticatedUser,
}

impl PackageOwner {
    pub fn from_repository_owner(owner: &str) -> Self {
        if owner == KNOWN_ORGANIZATION {
            Self::Organization(owner.to_string())
        } else {
            Self::AuthenticatedUser
        }
    }

    fn base_url(&self) -> String {
        match self {
            Self::Organization(org) => format!("orgs/{org}"),
            Self::AuthenticatedUser => "user".to_string(),
        }
    }
}

impl Display for PackageOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Organization(org) => f.write_str(org),
            Self::AuthenticatedUser => f.write_str("authenticated user"),
        }
    }
}

pub struct GithubClientImpl {
    client: Client,
    token: String,
    base_url: String,
    repository_owner: String,
    package_owner: PackageOwner,
}

impl GithubClientImpl {
    pub fn new(token: impl Into<String>, repository_owner: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, repository_owner, GITHUB_API_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        repository_owner: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        log::debug!("{}: {}", USER_AGENT.as_str(), user_agent);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent.try_into()?);

        let client = ClientBuilder::new().default_headers(headers).build()?;
        let repository_owner = repository_owner.into();
        let package_owner = PackageOwner::from_repository_owner(&repository_owner);
        log::debug!("Resolved package owner to {}", package_owner);

        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repository_owner,
            package_owner,
        })
    }

    pub fn package_owner(&self) -> &PackageOwner {
        &self.package_owner
    }

    fn branches_url(&self, repo: &str) -> String {
        format!(
            "{base}/repos/{owner}/{repo}/branches",
            base = self.base_url,
            owner = self.repository_owner,
        )
    }

    fn package_versions_url(&self, package_name: &str, package_type: &str) -> String {
        format!(
            "{base}/{owner}/packages/{package_type}/{package_name}/versions",
            base = self.base_url,
            owner = self.package_owner.base_url(),
            package_name = urlencoding::encode(package_name),
        )
    }

    /// Authenticated request. Headers live on the request only, the shared client is never touched.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT))
            .bearer_auth(&self.token)
    }

    /// Collect all pages of a list endpoint by following the `next` links.
    ///
    /// A non-200 reply ends the pagination and whatever was collected so far is returned.
    async fn read_all_pages<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let mut data = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            log::debug!("GET {}", url);
            let response = self
                .request(Method::GET, &url)
                .send()
                .await
                .context(format!("Failed to send request to {}", url))?;

            if response.status() != StatusCode::OK {
                log::warn!("Request to {} returned HTTP {}", url, response.status());
                break;
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);

            let mut page: Vec<T> = response
                .json()
                .await
                .context(format!("Failed to parse reply of {} as json", url))?;
            data.append(&mut page);
        }

        log::debug!("Exiting pagination loop");
        Ok(data)
    }
}

#[async_trait]
impl GithubClient for GithubClientImpl {
    async fn get_branches(&self, repo: &str) -> Result<Vec<Branch>> {
        self.read_all_pages(self.branches_url(repo)).await
    }

    async fn get_package_versions(
        &self,
        package_name: &str,
        package_type: &str,
    ) -> Result<Vec<PackageVersion>> {
        self.read_all_pages(self.package_versions_url(package_name, package_type))
            .await
    }

    async fn delete_package_version(
        &self,
        package_name: &str,
        version: &PackageVersion,
    ) -> Result<()> {
        let response = self
            .request(Method::DELETE, &version.url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(anyhow!(
                "Failed to delete {} version {} (id {}): server returned status {}",
                package_name,
                version.name,
                version.id,
                response.status(),
            ));
        }

        Ok(())
    }
}

/// Extract the `rel="next"` target of a `Link` header.
fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            matches!(
                param.trim().split_once('='),
                Some((key, value)) if key.trim() == "rel"
                    && value.trim().trim_matches('"').split_whitespace().any(|rel| rel == "next")
            )
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|target| target.strip_suffix('>'))
            .map(str::to_string)
    })
}
