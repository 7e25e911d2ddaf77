use std::collections::BTreeMap;

use super::{Branch, PackageVersion};

/// Map the name of every branch starting with `pattern` to its branch.
pub fn filter_branches_by_name_pattern<'a>(
    branches: &'a [Branch],
    pattern: &str,
) -> BTreeMap<&'a str, &'a Branch> {
    branches
        .iter()
        .filter(|branch| branch.name.starts_with(pattern))
        .map(|branch| (branch.name.as_str(), branch))
        .collect()
}

/// Map versions having at least one tag starting with `pattern`, keyed by the first such tag.
pub fn filter_packages_by_tag_pattern<'a>(
    versions: &'a [PackageVersion],
    pattern: &str,
) -> BTreeMap<&'a str, &'a PackageVersion> {
    let mut matches = BTreeMap::new();
    for version in versions {
        let tags = version.tags().unwrap_or_default();
        if let Some(tag) = tags.iter().find(|tag| tag.starts_with(pattern)) {
            matches.insert(tag.as_str(), version);
        }
    }
    matches
}

/// Map versions with a present but empty tag list, keyed by version name.
pub fn filter_packages_untagged(versions: &[PackageVersion]) -> BTreeMap<&str, &PackageVersion> {
    versions
        .iter()
        .filter(|version| matches!(version.tags(), Some(tags) if tags.is_empty()))
        .map(|version| (version.name.as_str(), version))
        .collect()
}

/// Tags without a branch of the exact same name.
pub fn orphaned_tags<'a, V, B>(
    tagged: &BTreeMap<&'a str, V>,
    branches: &BTreeMap<&str, B>,
) -> Vec<&'a str> {
    tagged
        .keys()
        .filter(|tag| !branches.contains_key(*tag))
        .copied()
        .collect()
}
