//! Workflow context parsing and identity wrappers for pull request intake.

use url::Url;

use super::error::IntakeError;

/// Public GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, IntakeError> {
        if value.is_empty() {
            return Err(IntakeError::MissingRepository);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, IntakeError> {
        if value.is_empty() {
            return Err(IntakeError::MissingRepository);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    pub(crate) const fn new(value: u64) -> Result<Self, IntakeError> {
        if value == 0 {
            return Err(IntakeError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IntakeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PersonalAccessToken(<redacted>)")
    }
}

/// Pull request addressed by the workflow run, with the API base to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Builds a locator from the workflow's repository and git ref.
    ///
    /// `repository` is `owner/repo`; `git_ref` must be the pull request merge
    /// ref `refs/pull/<number>/merge`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRepository` or `MissingRepository` for a malformed
    /// repository, `InvalidGitRef` when the ref is not a pull request merge
    /// ref, `InvalidPullRequestNumber` when the number is not a positive
    /// integer, and `InvalidUrl` when `api_base` cannot be parsed.
    pub fn from_workflow(
        repository: &str,
        git_ref: &str,
        api_base: &str,
    ) -> Result<Self, IntakeError> {
        let (owner_segment, repository_segment) = repository
            .split_once('/')
            .filter(|(_, name)| !name.contains('/'))
            .ok_or_else(|| IntakeError::InvalidRepository {
                value: repository.to_owned(),
            })?;
        let owner = RepositoryOwner::new(owner_segment)?;
        let name = RepositoryName::new(repository_segment)?;
        let number = parse_merge_ref(git_ref)?;
        let parsed_base =
            Url::parse(api_base).map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base: parsed_base,
            owner,
            repository: name,
            number,
        })
    }

    /// API base URL requests are sent to.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// `owner/repo`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    pub(crate) fn pull_request_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn compare_path(&self, base: &str, head: &str) -> String {
        format!(
            "/repos/{}/{}/compare/{base}...{head}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn reviews_path(&self) -> String {
        format!("{}/reviews", self.pull_request_path())
    }
}

fn parse_merge_ref(git_ref: &str) -> Result<PullRequestNumber, IntakeError> {
    let segments: Vec<&str> = git_ref.split('/').collect();
    let ["refs", "pull", number_segment, "merge"] = segments.as_slice() else {
        return Err(IntakeError::InvalidGitRef {
            value: git_ref.to_owned(),
        });
    };

    number_segment
        .parse::<u64>()
        .map_err(|_| IntakeError::InvalidPullRequestNumber)
        .and_then(PullRequestNumber::new)
}
