//! GitHub REST v3 implementation of the [`Forge`] trait.
//!
//! All requests go through [`GithubClient::get_json`], which maps each
//! failure layer to its own [`ForgeError`] variant. List endpoints are
//! paginated with `per_page=100` until a short page comes back.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ForgeError;
use crate::types::{GistDescriptor, RepoDescriptor};
use crate::{Forge, ListTarget};

const PER_PAGE: usize = 100;

/// Blocking GitHub REST client.
///
/// Holds a connection pool and the token; cheap to pass by reference into
/// the engines for the lifetime of one run.
pub struct GithubClient {
    http: reqwest::blocking::Client,
    api_url: String,
    token: String,
}

impl GithubClient {
    /// Build a client against `api_url` (normally `https://api.github.com`).
    pub fn new(api_url: &str, token: &str) -> Result<Self, ForgeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("forgesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ForgeError::Http {
                url: api_url.to_owned(),
                source,
            })?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForgeError> {
        debug!(url, "forge request");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
            .send()
            .map_err(|source| ForgeError::Http {
                url: url.to_owned(),
                source,
            })?;

        let code = response.status().as_u16();
        if code == 401 {
            return Err(ForgeError::Auth { code });
        }
        if !response.status().is_success() {
            return Err(ForgeError::Status {
                url: url.to_owned(),
                code,
            });
        }

        let body = response.text().map_err(|source| ForgeError::Http {
            url: url.to_owned(),
            source,
        })?;
        if body.trim().is_empty() {
            return Err(ForgeError::EmptyBody {
                url: url.to_owned(),
            });
        }
        serde_json::from_str(&body).map_err(|source| ForgeError::Decode {
            url: url.to_owned(),
            source,
        })
    }

    /// Fetch every page of a list endpoint. `path` starts with `/`; `extra`
    /// is an optional pre-encoded query fragment.
    fn get_paged<T: DeserializeOwned>(&self, path: &str, extra: &str) -> Result<Vec<T>, ForgeError> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let mut url = format!("{}{}?per_page={}&page={}", self.api_url, path, PER_PAGE, page);
            if !extra.is_empty() {
                url.push('&');
                url.push_str(extra);
            }
            let batch: Vec<T> = self.get_json(&url)?;
            let len = batch.len();
            all.extend(batch);
            if len < PER_PAGE {
                return Ok(all);
            }
            page += 1;
        }
    }
}

impl Forge for GithubClient {
    fn viewer_login(&self) -> Result<String, ForgeError> {
        let url = format!("{}/user", self.api_url);
        let account: RawAccount = self.get_json(&url)?;
        account.login.ok_or(ForgeError::MissingField {
            field: "login",
            context: "authenticated user".to_owned(),
        })
    }

    fn list_repositories(&self, target: &ListTarget) -> Result<Vec<RepoDescriptor>, ForgeError> {
        let raw: Vec<RawRepo> = match target {
            ListTarget::Viewer => self.get_paged("/user/repos", "affiliation=owner,organization_member")?,
            ListTarget::Organization(org) => {
                self.get_paged(&format!("/orgs/{org}/repos"), "type=all")?
            }
        };
        raw.into_iter().map(RepoDescriptor::try_from).collect()
    }

    fn list_starred(&self) -> Result<Vec<RepoDescriptor>, ForgeError> {
        let raw: Vec<RawRepo> = self.get_paged("/user/starred", "")?;
        raw.into_iter().map(RepoDescriptor::try_from).collect()
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<RepoDescriptor, ForgeError> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, name);
        let raw: RawRepo = self.get_json(&url)?;
        RepoDescriptor::try_from(raw)
    }

    fn list_topics(&self, owner: &str, name: &str) -> Result<Vec<String>, ForgeError> {
        let url = format!("{}/repos/{}/{}/topics", self.api_url, owner, name);
        let topics: RawTopics = self.get_json(&url)?;
        Ok(topics.names)
    }

    fn list_gists(&self, target: &ListTarget) -> Result<Vec<GistDescriptor>, ForgeError> {
        let raw: Vec<RawGist> = match target {
            ListTarget::Viewer => self.get_paged("/gists", "")?,
            // Organizations cannot own gists; the per-user endpoint simply
            // returns an empty list for them.
            ListTarget::Organization(org) => {
                self.get_paged(&format!("/users/{org}/gists"), "")?
            }
        };
        raw.into_iter().map(GistDescriptor::try_from).collect()
    }

    fn list_starred_gists(&self) -> Result<Vec<GistDescriptor>, ForgeError> {
        let raw: Vec<RawGist> = self.get_paged("/gists/starred", "")?;
        raw.into_iter().map(GistDescriptor::try_from).collect()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawAccount {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
    name: Option<String>,
    owner: Option<RawAccount>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    fork: bool,
    parent: Option<Box<RawRepo>>,
    ssh_url: Option<String>,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    topics: Vec<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTopics {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawGist {
    id: Option<String>,
    #[serde(default)]
    files: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    public: bool,
    fork_of: Option<serde_json::Value>,
    git_pull_url: Option<String>,
    owner: Option<RawAccount>,
}

impl RawRepo {
    /// Best-effort identity for MissingField messages, from whatever fields
    /// did arrive.
    fn describe(&self) -> String {
        match (&self.owner, &self.name) {
            (Some(RawAccount { login: Some(owner) }), Some(name)) => {
                format!("repository {owner}/{name}")
            }
            (_, Some(name)) => format!("repository {name}"),
            _ => "repository listing entry".to_owned(),
        }
    }
}

impl TryFrom<RawRepo> for RepoDescriptor {
    type Error = ForgeError;

    fn try_from(raw: RawRepo) -> Result<Self, ForgeError> {
        let context = raw.describe();
        let missing = |field: &'static str| ForgeError::MissingField {
            field,
            context: context.clone(),
        };

        let name = raw.name.ok_or_else(|| missing("name"))?;
        let owner = raw
            .owner
            .and_then(|account| account.login)
            .ok_or_else(|| missing("owner.login"))?;
        let ssh_url = raw.ssh_url.ok_or_else(|| missing("ssh_url"))?;
        let parent = raw
            .parent
            .map(|p| RepoDescriptor::try_from(*p).map(Box::new))
            .transpose()?;

        Ok(Self {
            name,
            owner,
            is_private: raw.private,
            is_fork: raw.fork,
            parent,
            ssh_url,
            has_wiki: raw.has_wiki,
            topics: raw.topics,
            language: raw.language,
        })
    }
}

impl TryFrom<RawGist> for GistDescriptor {
    type Error = ForgeError;

    fn try_from(raw: RawGist) -> Result<Self, ForgeError> {
        let id = raw.id.ok_or(ForgeError::MissingField {
            field: "id",
            context: "gist listing entry".to_owned(),
        })?;
        let missing = |field: &'static str| ForgeError::MissingField {
            field,
            context: format!("gist {id}"),
        };

        let pull_url = raw.git_pull_url.ok_or_else(|| missing("git_pull_url"))?;
        let owner = raw
            .owner
            .and_then(|account| account.login)
            .ok_or_else(|| missing("owner.login"))?;
        // Gists have no name field; the first file name (BTreeMap keeps the
        // keys sorted) stands in, with the id as a last resort.
        let display_name = raw
            .files
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| id.clone());

        Ok(Self {
            id,
            display_name,
            is_public: raw.public,
            is_fork: raw.fork_of.is_some(),
            pull_url,
            owner,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
