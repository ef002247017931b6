//! Application update check against GitHub releases

use crate::error::{MetadataError, Result};
use crate::providers::github::GitHubReleases;
use core_library::strings::natural_cmp;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Dotted version such as `2.4.0` or `v2.4.0-beta.1`
///
/// Missing components count as zero, so `2.4` equals `2.4.0`. A pre-release
/// is older than the release it precedes. Build metadata (`+...`) is ignored.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
    pre_release: Option<String>,
}

impl Version {
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = MetadataError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let unprefixed = trimmed
            .strip_prefix(['v', 'V'])
            .unwrap_or(trimmed);
        let without_build = unprefixed.split('+').next().unwrap_or_default();
        let (core, pre_release) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (without_build, None),
        };

        let components = core
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| MetadataError::InvalidVersion(value.to_string()))?;

        Ok(Self {
            components,
            pre_release: pre_release.filter(|pre| !pre.is_empty()),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", core.join("."))?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => natural_cmp(a, b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Checks whether a newer release than the running version exists
pub struct UpdateService {
    releases: GitHubReleases,
    owner: String,
    repo: String,
}

impl UpdateService {
    pub fn new(releases: GitHubReleases, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            releases,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Tag of the latest release when it is newer than `current_version`
    pub async fn check_for_updates(&self, current_version: &str) -> Result<Option<String>> {
        let current: Version = current_version.parse()?;

        let Some(release) = self.releases.latest_release(&self.owner, &self.repo).await? else {
            debug!(owner = %self.owner, repo = %self.repo, "Repository has no releases");
            return Ok(None);
        };

        if release.prerelease {
            debug!(tag = %release.tag_name, "Latest release is a pre-release, ignoring");
            return Ok(None);
        }

        let latest: Version = release.tag_name.parse()?;
        if latest > current {
            info!(current = %current, latest = %latest, "Update available");
            Ok(Some(release.tag_name))
        } else {
            debug!(current = %current, latest = %latest, "Up to date");
            Ok(None)
        }
    }
}
