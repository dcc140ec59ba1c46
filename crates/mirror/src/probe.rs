//! Parallel latency probing of mirrors.

use std::time::{Duration, Instant};

use log::{debug, warn};
use rayon::{ThreadPoolBuilder, prelude::*};
use reqwest::{StatusCode, blocking::Client};

use crate::{Error, Mirror, Result};

/// Per-request timeout for a latency probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// URL hit by the probe: the mirror root rather than the simple index.
pub fn probe_url(mirror_url: &str) -> String {
    let mut url = mirror_url.replace("/simple", "");
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Measures how long a mirror takes to answer.
pub trait Probe: Sync {
    fn probe(&self, url: &str) -> Result<Duration>;
}

/// Probe that issues one blocking HTTP GET.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self { client: Client::builder().timeout(timeout).build()? })
    }
}

impl Probe for HttpProbe {
    fn probe(&self, url: &str) -> Result<Duration> {
        let start = Instant::now();
        let response = self.client.get(url).send()?;
        let status = response.status();
        response.bytes()?;
        let elapsed = start.elapsed();

        if status != StatusCode::OK {
            return Err(Error::HttpStatus { status, url: url.to_string() });
        }
        Ok(elapsed)
    }
}

/// Outcome of probing one mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub mirror: Mirror,
    /// Round-trip time in milliseconds; infinite when unreachable.
    pub latency_ms: f64,
    pub reachable: bool,
}

impl ProbeResult {
    pub fn reachable(mirror: Mirror, latency: Duration) -> Self {
        Self { mirror, latency_ms: latency.as_secs_f64() * 1000.0, reachable: true }
    }

    pub fn unreachable(mirror: Mirror) -> Self {
        Self { mirror, latency_ms: f64::INFINITY, reachable: false }
    }
}

fn probe_one(probe: &impl Probe, mirror: &Mirror) -> ProbeResult {
    let url = probe_url(mirror.url);
    match probe.probe(&url) {
        Ok(latency) => {
            debug!("{}: {:.0}ms", mirror.name, latency.as_secs_f64() * 1000.0);
            ProbeResult::reachable(*mirror, latency)
        }
        Err(e) => {
            warn!("mirror {} probe failed: {e}", mirror.name);
            ProbeResult::unreachable(*mirror)
        }
    }
}

/// Probe every candidate concurrently, one worker per mirror.
///
/// Individual failures are recorded as unreachable; only a thread pool
/// failure is an error.
pub fn probe_all(probe: &impl Probe, candidates: &[Mirror]) -> Result<Vec<ProbeResult>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let pool = ThreadPoolBuilder::new().num_threads(candidates.len()).build()?;
    Ok(pool.install(|| candidates.par_iter().map(|mirror| probe_one(probe, mirror)).collect()))
}
