use std::time::{Duration, Instant};

use dailysync_core::TriggerConfig;
use reqwest::Url;
use tracing::{info, warn};

use crate::error::{Result, TriggerError};
use crate::job::Job;

pub const API_KEY_HEADER: &str = "X-Internal-Api-Key";
const USER_AGENT: &str = concat!("dailysync-trigger/", env!("CARGO_PKG_VERSION"));
/// Cap on how much of an error body ends up in the log.
const MAX_ERROR_BODY: usize = 512;

/// Result of a trigger the service accepted.
#[derive(Debug, Clone)]
pub struct TriggerOutcome {
    pub status: u16,
    pub elapsed: Duration,
}

/// Sends exactly one authenticated POST per [`Job`]. Never retries.
pub struct TriggerClient {
    http: reqwest::Client,
    config: TriggerConfig,
}

impl TriggerClient {
    pub fn new(config: TriggerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            // a redirect would turn the POST into a GET and the job would not run
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(TriggerError::Client)?;
        Ok(Self { http, config })
    }

    /// Full URL for `job`, query string included.
    pub fn endpoint(&self, job: &Job) -> Result<Url> {
        let raw = format!("{}{}", self.config.base_url, job.path());
        let mut url = Url::parse(&raw).map_err(|e| TriggerError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        let query = job.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn fire(&self, job: &Job) -> Result<TriggerOutcome> {
        let url = self.endpoint(job)?;
        info!(url = %url, "sending trigger request");

        let started = Instant::now();
        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let elapsed = started.elapsed();

        if !status.is_success() {
            let body = truncate(&body, MAX_ERROR_BODY);
            warn!(status = status.as_u16(), body = %body, "trigger rejected by server");
            return Err(TriggerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        job.log_summary(&body);
        Ok(TriggerOutcome {
            status: status.as_u16(),
            elapsed,
        })
    }

    fn classify(&self, e: reqwest::Error) -> TriggerError {
        if e.is_timeout() {
            self.timeout_error(e.is_connect())
        } else {
            TriggerError::Transport(e)
        }
    }

    /// Report the limit that actually expired.
    fn timeout_error(&self, connecting: bool) -> TriggerError {
        if connecting {
            TriggerError::ConnectTimeout {
                secs: self.config.connect_timeout_secs,
            }
        } else {
            TriggerError::Timeout {
                secs: self.config.timeout_secs,
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
