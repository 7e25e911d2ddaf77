use std::{collections::BTreeMap, env, process};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::Config;
use github::{
    filter_branches_by_name_pattern, filter_packages_by_tag_pattern, filter_packages_untagged,
    orphaned_tags, Branch, GithubClientImpl, PackageVersion,
};
use log::LevelFilter;

use crate::config::{FEATURE_BRANCH_PREFIX, PACKAGE_NAMES, PACKAGE_TYPE, TRACKED_REPOSITORY};
use crate::github::GithubClient;

mod config;
mod github;

/// Delete container images whose feature branch no longer exists.
///
/// Reads GITHUB_REPOSITORY_OWNER, GITHUB_REPOSITORY and TOKEN from the environment.
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Actually delete the container tags instead of only printing them
    #[clap(long)]
    delete: bool,

    /// Delete untagged container versions as well
    #[clap(long)]
    untagged: bool,

    /// Configures the logging level.
    /// You can also specify the log level via the RUST_LOG env variable.
    #[clap(long, value_enum, default_value = "info", ignore_case = true)]
    loglevel: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    fn as_filter(self) -> LevelFilter {
        match self {
            Self::Critical | Self::Error => LevelFilter::Error,
            Self::Warning => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct CleanupOptions {
    delete: bool,
    untagged: bool,
}

impl From<&Args> for CleanupOptions {
    fn from(args: &Args) -> Self {
        Self {
            delete: args.delete,
            untagged: args.untagged,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if env::var("RUST_LOG").is_err() {
        env::set_var(
            "RUST_LOG",
            format!("{}={}", env!("CARGO_CRATE_NAME"), args.loglevel.as_filter()),
        );
    }
    env_logger::init();

    log::info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    log::debug!("With arguments {:?}", env::args().collect::<Vec<_>>());

    if let Err(error) = run(args).await {
        log::error!("{:?}", error);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_env().context("Failed to read configuration")?;
    log::debug!("With configuration {:?}", config);

    let client = GithubClientImpl::new(&config.token, &config.repository_owner)
        .context("Failed to create github client")?;
    log::debug!("Looking up packages of {}", client.package_owner());

    cleanup(&client, &config, CleanupOptions::from(&args)).await
}

async fn cleanup(
    client: &impl GithubClient,
    config: &Config,
    options: CleanupOptions,
) -> Result<()> {
    let branches = client
        .get_branches(TRACKED_REPOSITORY)
        .await
        .context("Failed to get branches from github")?;
    log::info!(
        "Located {} branches of {}",
        branches.len(),
        config.repository,
    );

    let feature_branches = filter_branches_by_name_pattern(&branches, FEATURE_BRANCH_PREFIX);
    log::info!("Located {} feature branches", feature_branches.len());

    for package_name in PACKAGE_NAMES {
        clean_package(client, package_name, &feature_branches, options)
            .await
            .context(format!("Failed to clean package {}", package_name))?;
    }

    Ok(())
}

async fn clean_package(
    client: &impl GithubClient,
    package_name: &str,
    feature_branches: &BTreeMap<&str, &Branch>,
    options: CleanupOptions,
) -> Result<()> {
    let versions = client
        .get_package_versions(package_name, PACKAGE_TYPE)
        .await
        .context("Failed to get package versions from github")?;
    log::info!(
        "Located {} versions of package {}",
        versions.len(),
        package_name,
    );

    let tagged = filter_packages_by_tag_pattern(&versions, FEATURE_BRANCH_PREFIX);
    log::info!(
        "Located {} versions of package {} tagged \"{}\"",
        tagged.len(),
        package_name,
        FEATURE_BRANCH_PREFIX,
    );

    // Tags which were moved to another image leave the previous one behind without any tag
    let untagged = filter_packages_untagged(&versions);
    log::info!(
        "Located {} untagged versions of package {}",
        untagged.len(),
        package_name,
    );

    let orphaned = orphaned_tags(&tagged, feature_branches);
    log::info!(
        "Located {} versions of package {} to delete",
        orphaned.len(),
        package_name,
    );

    for tag in orphaned {
        delete_package_version(client, package_name, tag, tagged[tag], options.delete).await;
    }

    if options.untagged {
        log::info!("Deleting untagged packages of {}", package_name);
        for (name, version) in untagged {
            delete_package_version(client, package_name, name, version, options.delete).await;
        }
    } else {
        log::info!("Leaving untagged images untouched");
    }

    Ok(())
}

/// Delete a single version, or only report it if `delete` is false. Failures are logged and skipped.
async fn delete_package_version(
    client: &impl GithubClient,
    package_name: &str,
    label: &str,
    version: &PackageVersion,
    delete: bool,
) {
    if !delete {
        log::info!("Would delete {} (id {})", label, version.id);
        return;
    }

    log::info!("Deleting {} (id {})", label, version.id);
    if let Err(error) = client.delete_package_version(package_name, version).await {
        log::warn!("{:?}", error);
    }
}
