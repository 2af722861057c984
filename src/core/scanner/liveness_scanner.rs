// src/core/scanner/liveness_scanner.rs

use crate::config::ReconConfig;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeMethod, ProbeOutcome, ProbeResponse};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Sends one probe request. Implemented over reqwest for real runs and by
/// test doubles in tests.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn send(&self, method: ProbeMethod, url: &str) -> Result<ProbeResponse, ProbeError>;
}

/// `Prober` backed by a shared reqwest client that follows redirects.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(config: &ReconConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.client_timeout)
            .redirect(redirect_policy(config.max_redirects))
            .build()?;
        Ok(Self { client })
    }
}

/// Follows up to `max` redirects, then hands back the last 3xx response
/// instead of an error so its status can be recorded.
fn redirect_policy(max: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= max {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

#[async_trait]
impl Prober for HttpProber {
    async fn send(&self, method: ProbeMethod, url: &str) -> Result<ProbeResponse, ProbeError> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };
        // Any final status is an answer; the body of a GET is never read.
        let response = request.send().await?;
        let status = response.status();
        if status.is_redirection() && response.headers().contains_key(LOCATION) {
            return Err(ProbeError::Status {
                status: status.as_u16(),
                message: format!("too many redirects, stopped at {}", response.url()),
            });
        }
        Ok(ProbeResponse {
            status: status.as_u16(),
            final_url: response.url().to_string(),
        })
    }
}

/// Checks many URLs concurrently under a fixed concurrency budget.
///
/// Each URL gets a HEAD request; if that fails without any HTTP answer, one
/// GET is sent instead. A response with any status code, including 4xx and
/// 5xx, counts as an answer and is recorded as-is.
pub struct LivenessChecker<P: Prober> {
    prober: Arc<P>,
    concurrency: usize,
    timeout: Duration,
}

impl LivenessChecker<HttpProber> {
    pub fn from_config(config: &ReconConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(HttpProber::new(config)?, config.concurrency, config.probe_timeout))
    }
}

impl<P: Prober> LivenessChecker<P> {
    pub fn new(prober: P, concurrency: usize, timeout: Duration) -> Self {
        Self { prober: Arc::new(prober), concurrency: concurrency.max(1), timeout }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probes every URL and returns one outcome per input URL.
    ///
    /// All probes are spawned up front and the call returns only after each
    /// of them has finished. Outcomes come back in input order, though
    /// callers should not rely on it.
    pub async fn check_all(&self, urls: Vec<String>) -> Vec<ProbeOutcome> {
        info!(count = urls.len(), concurrency = self.concurrency, "Starting liveness checks.");
        let budget = Arc::new(Semaphore::new(self.concurrency));

        let (urls, handles): (Vec<_>, Vec<_>) = urls
            .into_iter()
            .map(|url| {
                let task = probe_url(Arc::clone(&self.prober), Arc::clone(&budget), url.clone(), self.timeout);
                (url, tokio::spawn(task))
            })
            .unzip();

        let outcomes: Vec<ProbeOutcome> = urls
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(url, joined)| {
                joined.unwrap_or_else(|e| {
                    warn!(url = %url, error = %e, "Probe task did not complete.");
                    let error = ProbeError::Task(e.to_string());
                    ProbeOutcome::failed(url, ProbeMethod::Head, None, error.to_string())
                })
            })
            .collect();

        let live = outcomes.iter().filter(|o| o.is_live()).count();
        info!(total = outcomes.len(), live, "Liveness checks finished.");
        outcomes
    }
}

/// Runs the HEAD then GET protocol for one URL while holding a budget unit.
async fn probe_url<P: Prober>(
    prober: Arc<P>,
    budget: Arc<Semaphore>,
    url: String,
    timeout: Duration,
) -> ProbeOutcome {
    // The permit is released when it drops, on every return path and on panic.
    let _permit = match budget.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return ProbeOutcome::failed(url, ProbeMethod::Head, None, e.to_string()),
    };

    let head_error = match send_with_timeout(prober.as_ref(), ProbeMethod::Head, &url, timeout).await {
        Ok(response) => {
            debug!(url = %url, status = response.status, "HEAD answered.");
            return ProbeOutcome::answered(url, ProbeMethod::Head, response);
        }
        Err(e @ ProbeError::Status { .. }) => {
            debug!(url = %url, error = %e, "HEAD failed with a status, not falling back.");
            return ProbeOutcome::failed(url, ProbeMethod::Head, e.status(), e.to_string());
        }
        Err(e) => e,
    };

    debug!(url = %url, error = %head_error, "HEAD failed, falling back to GET.");
    match send_with_timeout(prober.as_ref(), ProbeMethod::Get, &url, timeout).await {
        Ok(response) => {
            debug!(url = %url, status = response.status, "GET fallback answered.");
            ProbeOutcome::answered(url, ProbeMethod::Get, response)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "URL unreachable.");
            ProbeOutcome::failed(url, ProbeMethod::Get, e.status(), e.to_string())
        }
    }
}

async fn send_with_timeout<P: Prober>(
    prober: &P,
    method: ProbeMethod,
    url: &str,
    timeout: Duration,
) -> Result<ProbeResponse, ProbeError> {
    tokio::time::timeout(timeout, prober.send(method, url))
        .await
        .unwrap_or(Err(ProbeError::Timeout))
}

/// Keeps only URLs the prober can handle (`http://` and `https://`).
pub fn probe_targets(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .cloned()
        .collect()
}
