//! Persisted session: access token, username, monitored repositories.
//!
//! Stored as `session.json` in the config directory. The file holds a
//! credential, so on Unix it is created with mode `0600`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use nag_github::AccessToken;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repo_name::RepoName;

const SESSION_FILE: &str = "session.json";

/// On-disk session layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    repositories: Vec<RepoName>,
}

/// Manages the persisted session inside a config directory.
#[derive(Debug, Clone)]
pub struct State {
    dir: PathBuf,
}

impl State {
    /// Create a state handle rooted at `dir`. Nothing is read or written yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load(&self) -> Result<Session> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(Session::default());
        }

        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.session_path();
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(session)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut Session)) -> Result<()> {
        let mut session = self.load()?;
        change(&mut session);
        self.save(&session)
    }

    // === Token ===

    /// The stored access token, if any.
    ///
    /// # Errors
    /// Returns error if the session file cannot be read.
    pub fn token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .load()?
            .token
            .map(AccessToken::new)
            .filter(|token| !token.is_empty()))
    }

    /// The stored access token, or [`Error::NotAuthenticated`].
    ///
    /// # Errors
    /// Returns error if no token is stored or the session cannot be read.
    pub fn require_token(&self) -> Result<AccessToken> {
        self.token()?.ok_or(Error::NotAuthenticated)
    }

    /// Whether a token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    /// Store an access token.
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    pub fn save_token(&self, token: &AccessToken) -> Result<()> {
        let raw = token.expose().to_string();
        self.update(|session| session.token = Some(raw))
    }

    // === Username ===

    /// The stored GitHub login, if any.
    ///
    /// # Errors
    /// Returns error if the session file cannot be read.
    pub fn username(&self) -> Result<Option<String>> {
        Ok(self.load()?.username)
    }

    /// Store the GitHub login.
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    pub fn save_username(&self, username: &str) -> Result<()> {
        let username = username.to_string();
        self.update(|session| session.username = Some(username))
    }

    // === Repositories ===

    /// Monitored repositories. Empty means "every repository".
    ///
    /// # Errors
    /// Returns error if the session file cannot be read.
    pub fn repositories(&self) -> Result<Vec<RepoName>> {
        Ok(self.load()?.repositories)
    }

    /// Replace the monitored repositories, dropping repeats (first one wins).
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    pub fn save_repositories(&self, repositories: &[RepoName]) -> Result<()> {
        let mut unique: Vec<RepoName> = Vec::with_capacity(repositories.len());
        for repo in repositories {
            if !unique.contains(repo) {
                unique.push(repo.clone());
            }
        }

        self.update(|session| session.repositories = unique)
    }

    // === Logout ===

    /// Forget the token, the username and the repository list.
    ///
    /// # Errors
    /// Returns error if the session file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
