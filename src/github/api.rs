use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<BranchCommit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BranchCommit {
    pub sha: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub id: u64,
    pub name: String,
    /// API url of this version, also used to delete it.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PackageVersionMetadata>,
}

impl PackageVersion {
    /// Container tags of this version. `None` if the registry didn't report a tag list at all.
    pub fn tags(&self) -> Option<&[String]> {
        self.metadata
            .as_ref()?
            .container
            .as_ref()?
            .tags
            .as_deref()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerVersionMetadata>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerVersionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_version() {
        let version: PackageVersion = serde_json::from_str(
            r#"{
                "id": 42,
                "name": "sha256:abc",
                "url": "https://api.github.com/orgs/org/packages/container/pkg/versions/42",
                "package_html_url": "https://github.com/orgs/org/packages/container/package/pkg",
                "created_at": "2022-05-01T12:00:00Z",
                "metadata": {
                    "package_type": "container",
                    "container": { "tags": ["feature-a", "latest"] }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(version.id, 42);
        assert_eq!(
            version.tags(),
            Some(&["feature-a".to_string(), "latest".to_string()][..])
        );
    }

    #[test]
    fn test_tags_absent_is_not_empty() {
        let no_metadata: PackageVersion =
            serde_json::from_str(r#"{"id": 1, "name": "a", "url": "u"}"#).unwrap();
        let no_container: PackageVersion = serde_json::from_str(
            r#"{"id": 2, "name": "b", "url": "u", "metadata": {"package_type": "container"}}"#,
        )
        .unwrap();
        let no_tags: PackageVersion = serde_json::from_str(
            r#"{"id": 3, "name": "c", "url": "u", "metadata": {"container": {}}}"#,
        )
        .unwrap();
        let empty_tags: PackageVersion = serde_json::from_str(
            r#"{"id": 4, "name": "d", "url": "u", "metadata": {"container": {"tags": []}}}"#,
        )
        .unwrap();

        assert_eq!(no_metadata.tags(), None);
        assert_eq!(no_container.tags(), None);
        assert_eq!(no_tags.tags(), None);
        assert_eq!(empty_tags.tags(), Some(&[][..]));
    }

    #[test]
    fn test_parse_branch() {
        let branch: Branch = serde_json::from_str(
            r#"{
                "name": "feature-a",
                "commit": { "sha": "c5b97d5", "url": "https://api.github.com/repos/o/r/commits/c5b97d5" },
                "protected": false
            }"#,
        )
        .unwrap();

        assert_eq!(branch.name, "feature-a");
        assert_eq!(branch.protected, Some(false));
        assert_eq!(branch.commit.unwrap().sha, "c5b97d5");
    }
}
