use crate::datasource::ProcessDataSource;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Shortest time allowed between two liveness sweeps.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of [`SeenPidCache::maybe_evict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Too soon since the last sweep
    NotDue,
    Swept { evicted: usize },
    /// The process table could not be read; nothing was removed
    Failed,
}

/// PIDs that have already been recorded.
///
/// A PID stays in the cache for as long as the OS reports it alive, so a
/// long-running git process is recorded once. Entries never expire by age.
#[derive(Debug)]
pub struct SeenPidCache {
    /// pid -> first admitted at
    entries: HashMap<u32, Instant>,
    sweep_interval: Duration,
    last_sweep: Instant,
}

impl SeenPidCache {
    /// `ttl` sets the sweep cadence, which is never shorter than a minute.
    pub fn new(ttl: Duration, now: Instant) -> Self {
        Self {
            entries: HashMap::new(),
            sweep_interval: ttl.max(MIN_SWEEP_INTERVAL),
            last_sweep: now,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// True the first time `pid` is offered, false until it is evicted.
    pub fn admit(&mut self, pid: u32, now: Instant) -> bool {
        if self.entries.contains_key(&pid) {
            return false;
        }
        self.entries.insert(pid, now);
        true
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.entries.contains_key(&pid)
    }

    pub fn first_seen(&self, pid: u32) -> Option<Instant> {
        self.entries.get(&pid).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop PIDs the OS no longer reports, at most once per sweep interval.
    pub fn maybe_evict<P: ProcessDataSource + ?Sized>(&mut self, now: Instant, source: &P) -> Sweep {
        if now.saturating_duration_since(self.last_sweep) < self.sweep_interval {
            return Sweep::NotDue;
        }
        self.last_sweep = now;

        let live = match source.live_pids() {
            Ok(live) => live,
            Err(err) => {
                error!(error = %err, "failed to list processes for pid cache sweep");
                return Sweep::Failed;
            }
        };

        let before = self.entries.len();
        self.entries.retain(|pid, _| live.contains(pid));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.entries.len(), "evicted exited pids");
        }

        Sweep::Swept { evicted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::ProcessInfo;
    use anyhow::{bail, Result};
    use std::collections::HashSet;

    struct Live(Vec<u32>);

    impl ProcessDataSource for Live {
        fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
            Ok(self
                .0
                .iter()
                .map(|&pid| ProcessInfo {
                    pid,
                    ..Default::default()
                })
                .collect())
        }
    }

    struct Broken;

    impl ProcessDataSource for Broken {
        fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
            bail!("permission denied")
        }
    }

    fn cache(start: Instant) -> SeenPidCache {
        SeenPidCache::new(MIN_SWEEP_INTERVAL, start)
    }

    #[test]
    fn test_admit_once() {
        let start = Instant::now();
        let mut seen = cache(start);
        assert!(seen.admit(42, start));
        assert!(!seen.admit(42, start));
        assert!(!seen.admit(42, start + Duration::from_secs(3600)));
        assert!(seen.admit(43, start));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.first_seen(42), Some(start));
    }

    #[test]
    fn test_sweep_interval_has_a_floor() {
        let start = Instant::now();
        assert_eq!(cache(start).sweep_interval(), MIN_SWEEP_INTERVAL);
        let long = SeenPidCache::new(Duration::from_secs(300), start);
        assert_eq!(long.sweep_interval(), Duration::from_secs(300));
        let short = SeenPidCache::new(Duration::from_secs(10), start);
        assert_eq!(short.sweep_interval(), MIN_SWEEP_INTERVAL);
    }

    #[test]
    fn test_short_ttl_does_not_sweep_early() {
        let start = Instant::now();
        let mut seen = SeenPidCache::new(Duration::from_secs(10), start);
        seen.admit(1, start);

        let early = seen.maybe_evict(start + Duration::from_secs(11), &Live(vec![]));
        assert_eq!(early, Sweep::NotDue);
        assert!(seen.contains(1));

        let due = seen.maybe_evict(start + Duration::from_secs(61), &Live(vec![]));
        assert_eq!(due, Sweep::Swept { evicted: 1 });
        assert!(!seen.contains(1));
    }

    #[test]
    fn test_sweep_not_due() {
        let start = Instant::now();
        let mut seen = cache(start);
        seen.admit(1, start);
        let result = seen.maybe_evict(start + Duration::from_secs(59), &Live(vec![]));
        assert_eq!(result, Sweep::NotDue);
        assert!(seen.contains(1));
    }

    #[test]
    fn test_sweep_keeps_live_pids() {
        let start = Instant::now();
        let mut seen = cache(start);
        for pid in [1, 2, 3] {
            seen.admit(pid, start);
        }

        let later = start + Duration::from_secs(61);
        let result = seen.maybe_evict(later, &Live(vec![2, 3, 99]));
        assert_eq!(result, Sweep::Swept { evicted: 1 });
        assert!(!seen.contains(1));
        assert!(seen.contains(2));
        assert!(seen.contains(3));

        // Evicted pids can be admitted again, live ones cannot.
        assert!(seen.admit(1, later));
        assert!(!seen.admit(2, later));

        // The next sweep waits a full interval again.
        let result = seen.maybe_evict(later + Duration::from_secs(1), &Live(vec![]));
        assert_eq!(result, Sweep::NotDue);
    }

    #[test]
    fn test_sweep_never_removes_live_pid() {
        let start = Instant::now();
        let mut seen = cache(start);
        let pids: Vec<u32> = (1..=50).collect();
        for &pid in &pids {
            seen.admit(pid, start);
        }
        let live: Vec<u32> = pids.iter().copied().filter(|p| p % 3 == 0).collect();

        seen.maybe_evict(start + Duration::from_secs(120), &Live(live.clone()));

        let remaining: HashSet<u32> = pids.into_iter().filter(|&p| seen.contains(p)).collect();
        assert_eq!(remaining, live.into_iter().collect::<HashSet<_>>());
    }

    #[test]
    fn test_failed_sweep_leaves_cache_untouched() {
        let start = Instant::now();
        let mut seen = cache(start);
        seen.admit(7, start);
        let result = seen.maybe_evict(start + Duration::from_secs(61), &Broken);
        assert_eq!(result, Sweep::Failed);
        assert!(seen.contains(7));
    }
}
