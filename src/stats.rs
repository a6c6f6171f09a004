use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const RETRY_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub last_commit_date: String,
    pub open_issues: u64,
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("repository {0} not found")]
    NotFound(String),
    #[error("repository identifier {0:?} is not of the form owner/name")]
    InvalidRepository(String),
    #[error("stats request failed: {0}")]
    Transport(String),
    #[error("stats service responded with {0}")]
    Status(u16),
}

impl From<reqwest::Error> for StatsError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

pub fn validate_repo(repo: &str) -> Result<(), StatsError> {
    match repo.split_once('/') {
        Some((owner, name))
            if !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/') =>
        {
            Ok(())
        }
        _ => Err(StatsError::InvalidRepository(repo.to_owned())),
    }
}

pub trait StatsSource: Send + Sync {
    fn fetch(&self, repo: &str) -> Result<RepoStats, StatsError>;
}

#[derive(Deserialize)]
struct GithubRepoResponse {
    stargazers_count: u64,
    forks_count: u64,
    #[serde(default)]
    pushed_at: Option<String>,
    open_issues_count: u64,
}

pub struct GithubSource {
    client: Client,
    api_base: String,
}

impl GithubSource {
    pub fn new(api_base: &str, token: Option<&str>) -> Result<Self, StatsError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("DevVerse-Agent"));
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("token {}", token.trim()))
                .map_err(|error| StatsError::Transport(error.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_owned(),
        })
    }
}

impl StatsSource for GithubSource {
    fn fetch(&self, repo: &str) -> Result<RepoStats, StatsError> {
        validate_repo(repo)?;

        let response = self
            .client
            .get(format!("{}/repos/{repo}", self.api_base))
            .send()?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(StatsError::NotFound(repo.to_owned())),
            status if !status.is_success() => return Err(StatsError::Status(status.as_u16())),
            _ => {}
        }

        let body: GithubRepoResponse = response.json()?;
        Ok(RepoStats {
            stars: body.stargazers_count,
            forks: body.forks_count,
            last_commit_date: body.pushed_at.unwrap_or_default(),
            open_issues: body.open_issues_count,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsState {
    Loading,
    Ready(RepoStats),
    NotFound,
    Unavailable,
}

struct CachedStats {
    state: StatsState,
    fetched_at: Instant,
}

/// Per-repository stats with one in-flight worker per key.
pub struct StatsCache {
    source: Arc<dyn StatsSource>,
    ttl: Duration,
    entries: HashMap<String, CachedStats>,
    in_flight: HashMap<String, Receiver<Result<RepoStats, StatsError>>>,
}

impl StatsCache {
    pub fn new(source: Arc<dyn StatsSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    fn is_fresh(&self, entry: &CachedStats, now: Instant) -> bool {
        let lifetime = match entry.state {
            StatsState::Unavailable => RETRY_BACKOFF.min(self.ttl),
            _ => self.ttl,
        };
        now.saturating_duration_since(entry.fetched_at) < lifetime
    }

    /// Starts a fetch unless one is running or a fresh result is cached.
    pub fn request(&mut self, repo: &str, now: Instant) {
        if self.in_flight.contains_key(repo) {
            return;
        }
        if let Some(entry) = self.entries.get(repo)
            && self.is_fresh(entry, now)
        {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let key = repo.to_owned();
        tracing::debug!(repo, "fetching repository stats");
        thread::spawn(move || {
            let _ = tx.send(source.fetch(&key));
        });
        self.in_flight.insert(repo.to_owned(), rx);
    }

    /// Collects finished fetches; returns true when any entry changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut finished = Vec::new();
        for (repo, rx) in &self.in_flight {
            match rx.try_recv() {
                Ok(result) => finished.push((repo.clone(), Some(result))),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => finished.push((repo.clone(), None)),
            }
        }

        let changed = !finished.is_empty();
        for (repo, result) in finished {
            self.in_flight.remove(&repo);
            let state = match result {
                Some(Ok(stats)) => StatsState::Ready(stats),
                Some(Err(StatsError::NotFound(_))) => StatsState::NotFound,
                Some(Err(error)) => {
                    tracing::warn!(repo, %error, "repository stats unavailable");
                    StatsState::Unavailable
                }
                None => {
                    tracing::warn!(repo, "stats worker exited without a result");
                    StatsState::Unavailable
                }
            };
            self.entries.insert(
                repo,
                CachedStats {
                    state,
                    fetched_at: now,
                },
            );
        }
        changed
    }

    pub fn is_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn state(&self, repo: &str) -> Option<StatsState> {
        if self.in_flight.contains_key(repo) {
            return Some(StatsState::Loading);
        }
        self.entries.get(repo).map(|entry| entry.state.clone())
    }
}
