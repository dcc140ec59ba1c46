//! Mirror selection.

use log::warn;

use crate::{Mirror, ProbeResult, Registry, Result, probe::{Probe, probe_all}};

/// How a mirror was chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Named by the user; no probing took place.
    Manual(Mirror),
    /// Lowest-latency reachable mirror.
    Fastest { mirror: Mirror, latency_ms: f64 },
    /// Nothing answered; the official mirror is used.
    Fallback(Mirror),
}

impl Selection {
    pub fn mirror(&self) -> &Mirror {
        match self {
            Selection::Manual(mirror) | Selection::Fallback(mirror) => mirror,
            Selection::Fastest { mirror, .. } => mirror,
        }
    }
}

/// Selection together with the probe results that led to it.
#[derive(Debug, Clone)]
pub struct Choice {
    pub selection: Selection,
    pub probes: Vec<ProbeResult>,
}

/// Pick the reachable mirror with the lowest latency.
///
/// Ties keep the earlier result. With nothing reachable, falls back to the
/// registry's official mirror.
pub fn select_fastest(results: &[ProbeResult], registry: &Registry) -> Selection {
    results
        .iter()
        .filter(|r| r.reachable)
        .min_by(|a, b| a.latency_ms.total_cmp(&b.latency_ms))
        .map(|r| Selection::Fastest { mirror: r.mirror, latency_ms: r.latency_ms })
        .unwrap_or(Selection::Fallback(*registry.official()))
}

/// Resolve a manual mirror name or probe the registry's probe set.
///
/// An unknown manual name is ignored with a warning.
pub fn choose_mirror(
    registry: &Registry,
    probe: &impl Probe,
    manual: Option<&str>,
) -> Result<Choice> {
    if let Some(name) = manual {
        match registry.find(name) {
            Some(mirror) => {
                return Ok(Choice { selection: Selection::Manual(*mirror), probes: Vec::new() });
            }
            None => warn!("unknown mirror '{name}', probing instead"),
        }
    }

    let probes = probe_all(probe, registry.probe_set())?;
    let selection = select_fastest(&probes, registry);
    Ok(Choice { selection, probes })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::Error;

    const A: Mirror = Mirror::new("a", "A", "https://a.example/simple");
    const B: Mirror = Mirror::new("b", "B", "https://b.example/simple");
    const C: Mirror = Mirror::new("c", "C", "https://c.example/simple");
    const OFFICIAL: Mirror = Mirror::new("official", "Official", "https://official.example/simple");

    fn registry() -> Registry {
        Registry::new(vec![A, B, C, OFFICIAL], &["a", "b", "c"], "official").unwrap()
    }

    #[derive(Default)]
    struct CountingProbe(AtomicUsize);

    impl Probe for CountingProbe {
        fn probe(&self, url: &str) -> Result<Duration> {
            self.0.fetch_add(1, Ordering::SeqCst);
            match url {
                "https://a.example/" => Ok(Duration::from_millis(50)),
                "https://b.example/" => Ok(Duration::from_millis(20)),
                _ => Err(Error::InvalidUrl(url.to_string())),
            }
        }
    }

    #[test]
    fn picks_minimum_latency() {
        let results = [
            ProbeResult::reachable(A, Duration::from_millis(50)),
            ProbeResult::reachable(B, Duration::from_millis(20)),
            ProbeResult::unreachable(C),
        ];
        assert_eq!(select_fastest(&results, &registry()).mirror(), &B);
    }

    #[test]
    fn all_unreachable_falls_back_to_official() {
        let results = [ProbeResult::unreachable(A), ProbeResult::unreachable(B)];
        assert_eq!(select_fastest(&results, &registry()), Selection::Fallback(OFFICIAL));
        assert_eq!(select_fastest(&[], &registry()), Selection::Fallback(OFFICIAL));
    }

    #[test]
    fn ties_keep_first_result() {
        let results = [
            ProbeResult::reachable(C, Duration::from_millis(30)),
            ProbeResult::reachable(A, Duration::from_millis(30)),
        ];
        assert_eq!(select_fastest(&results, &registry()).mirror(), &C);
    }

    #[test]
    fn manual_name_skips_probing() {
        let probe = CountingProbe::default();
        let choice = choose_mirror(&registry(), &probe, Some("C")).unwrap();
        assert_eq!(choice.selection, Selection::Manual(C));
        assert!(choice.probes.is_empty());
        assert_eq!(probe.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_manual_name_probes() {
        let probe = CountingProbe::default();
        let choice = choose_mirror(&registry(), &probe, Some("nowhere")).unwrap();
        assert_eq!(probe.0.load(Ordering::SeqCst), 3);
        assert_eq!(choice.probes.len(), 3);
        assert_eq!(choice.selection.mirror(), &B);
    }
}
