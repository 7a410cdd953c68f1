//! Repository identifier validation and newtype.
//!
//! Provides a [`RepoName`] type for `owner/name` identifiers. Monitored
//! repositories end up inside search queries, so anything that could
//! change the meaning of a query (spaces, qualifiers, quotes) is rejected
//! up front.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A validated `owner/name` repository identifier.
///
/// # Examples
///
/// ```
/// use nag_core::RepoName;
///
/// let repo = RepoName::new("rust-lang/rust").unwrap();
/// assert_eq!(repo.owner(), "rust-lang");
/// assert_eq!(repo.name(), "rust");
///
/// // Surrounding whitespace is trimmed
/// assert_eq!(RepoName::new("  tokio-rs/tokio ").unwrap(), "tokio-rs/tokio");
///
/// assert!(RepoName::new("just-a-name").is_err());
/// assert!(RepoName::new("owner/name/extra").is_err());
/// assert!(RepoName::new("owner/na me").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName(String);

impl RepoName {
    /// Create a new validated repository identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepoName`] unless the trimmed input is
    /// exactly `owner/name` with allowed characters.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let trimmed = name.trim();
        validate_repo_name(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owner (user or organization) part.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// The repository part.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, name)| name)
    }

    /// Parse a list of identifiers, skipping blank entries.
    ///
    /// # Errors
    ///
    /// Returns the error for the first invalid, non-blank entry.
    pub fn parse_list<I, S>(inputs: I) -> Result<Vec<Self>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .filter(|input| !input.as_ref().trim().is_empty())
            .map(|input| Self::new(input.as_ref()))
            .collect()
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RepoName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for RepoName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RepoName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for RepoName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepoName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> Error {
    Error::InvalidRepoName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate an `owner/name` pair.
fn validate_repo_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(invalid(name, "repository cannot be empty"));
    }

    let Some((owner, repo)) = name.split_once('/') else {
        return Err(invalid(name, "expected format owner/repository"));
    };

    if repo.contains('/') {
        return Err(invalid(name, "expected exactly one '/'"));
    }

    for (part, label) in [(owner, "owner"), (repo, "repository name")] {
        if part.is_empty() {
            return Err(invalid(name, format!("{label} cannot be empty")));
        }

        if part == "." || part == ".." {
            return Err(invalid(name, format!("{label} cannot be '{part}'")));
        }

        if let Some(c) = part
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(name, format!("{label} cannot contain '{c}'")));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_repo_names() {
        assert!(RepoName::new("torvalds/linux").is_ok());
        assert!(RepoName::new("apple/swift").is_ok());
        assert!(RepoName::new("my-org/my_repo.rs").is_ok());
        assert!(RepoName::new("A1/b2").is_ok());
        assert!(RepoName::new("owner/.github").is_ok());
    }

    #[test]
    fn test_trims_whitespace() {
        let repo = RepoName::new("\tfoo/bar  ").unwrap();
        assert_eq!(repo.as_str(), "foo/bar");
    }

    #[test]
    fn test_empty() {
        let err = RepoName::new("   ").unwrap_err();
        assert!(matches!(err, Error::InvalidRepoName { .. }));
    }

    #[test]
    fn test_missing_slash() {
        assert!(RepoName::new("linux").is_err());
    }

    #[test]
    fn test_empty_parts() {
        assert!(RepoName::new("/linux").is_err());
        assert!(RepoName::new("torvalds/").is_err());
        assert!(RepoName::new("/").is_err());
    }

    #[test]
    fn test_too_many_parts() {
        assert!(RepoName::new("a/b/c").is_err());
    }

    #[test]
    fn test_dot_components() {
        assert!(RepoName::new("../etc").is_err());
        assert!(RepoName::new("owner/..").is_err());
        assert!(RepoName::new("./repo").is_err());
    }

    #[test]
    fn test_query_injection_rejected() {
        // These would otherwise widen or alter the search query.
        assert!(RepoName::new("a/b is:closed").is_err());
        assert!(RepoName::new("a/b\"").is_err());
        assert!(RepoName::new("a:b/c").is_err());
    }

    #[test]
    fn test_parts() {
        let repo = RepoName::new("rust-lang/cargo").unwrap();
        assert_eq!(repo.owner(), "rust-lang");
        assert_eq!(repo.name(), "cargo");
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        let repos = RepoName::parse_list(["a/x", "  ", "", " b/y "]).unwrap();
        assert_eq!(repos, vec!["a/x", "b/y"]);

        assert!(RepoName::parse_list(["a/x", "bogus"]).is_err());
        assert!(RepoName::parse_list(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let repo = RepoName::new("foo/bar").unwrap();
        let json = serde_json::to_string(&repo).unwrap();
        assert_eq!(json, "\"foo/bar\"");
        let parsed: RepoName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, repo);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<RepoName, _> = serde_json::from_str("\"not a repo\"");
        assert!(result.is_err());
    }
}
