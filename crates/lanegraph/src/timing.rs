use std::time::{Duration, Instant};

const TIMING_ENV: &str = "LANEGRAPH_RENDER_TIMING";

fn env_flag(raw: Option<&str>) -> bool {
    const OFF: [&str; 4] = ["0", "false", "no", "off"];
    raw.map(str::trim)
        .is_some_and(|v| !v.is_empty() && !OFF.iter().any(|f| v.eq_ignore_ascii_case(f)))
}

fn timing_requested() -> bool {
    static REQUESTED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
    *REQUESTED.get_or_init(|| env_flag(std::env::var(TIMING_ENV).ok().as_deref()))
}

/// Stages of one `layout_history` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Validate,
    Index,
    Walk,
    Resolve,
}

impl Phase {
    const ALL: [Phase; 4] = [Phase::Validate, Phase::Index, Phase::Walk, Phase::Resolve];

    fn label(self) -> &'static str {
        match self {
            Phase::Validate => "validate",
            Phase::Index => "index",
            Phase::Walk => "walk",
            Phase::Resolve => "resolve",
        }
    }
}

/// Per-phase stopwatch for a single layout. Inert unless `LANEGRAPH_RENDER_TIMING` is set.
#[derive(Debug)]
pub(crate) struct PhaseClock {
    started: Option<Instant>,
    spent: [Duration; 4],
}

impl PhaseClock {
    pub(crate) fn from_env() -> Self {
        Self::new(timing_requested())
    }

    fn new(enabled: bool) -> Self {
        Self {
            started: enabled.then(Instant::now),
            spent: [Duration::ZERO; 4],
        }
    }

    pub(crate) fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        if self.started.is_none() {
            return f();
        }
        let start = Instant::now();
        let out = f();
        self.spent[phase as usize] += start.elapsed();
        out
    }

    fn spent(&self, phase: Phase) -> Duration {
        self.spent[phase as usize]
    }

    /// Prints one `[render-timing]` line to stderr.
    pub(crate) fn finish(self, commits: usize, paths: usize) {
        let Some(started) = self.started else {
            return;
        };
        let mut line = format!("[render-timing] total={:?}", started.elapsed());
        for phase in Phase::ALL {
            line.push_str(&format!(" {}={:?}", phase.label(), self.spent(phase)));
        }
        eprintln!("{line} commits={commits} paths={paths}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_flag_treats_blank_and_negative_words_as_off() {
        assert!(!env_flag(None));
        assert!(!env_flag(Some("")));
        assert!(!env_flag(Some(" Off ")));
        assert!(!env_flag(Some("0")));
        assert!(env_flag(Some("1")));
        assert!(env_flag(Some("yes")));
    }

    #[test]
    fn enabled_clock_accumulates_per_phase() {
        let mut clock = PhaseClock::new(true);
        let v = clock.time(Phase::Walk, || {
            std::thread::sleep(Duration::from_millis(1));
            7
        });
        assert_eq!(v, 7);
        assert!(clock.spent(Phase::Walk) >= Duration::from_millis(1));
        assert_eq!(clock.spent(Phase::Index), Duration::ZERO);
    }

    #[test]
    fn disabled_clock_still_runs_the_closure() {
        let mut clock = PhaseClock::new(false);
        assert_eq!(clock.time(Phase::Validate, || "ran"), "ran");
        assert_eq!(clock.spent(Phase::Validate), Duration::ZERO);
    }
}
