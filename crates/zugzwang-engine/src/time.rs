//! Time management — convert clock parameters to search limits.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use zugzwang_core::Color;

use crate::search::control::SearchControl;

/// Move overhead — subtracted from the remaining clock to leave margin for
/// engine/GUI round-trip latency.
const OVERHEAD_MS: f64 = 50.0;

/// Compute `(max_ms, early_ms)` — the hard and soft deadlines — from the
/// remaining time and increment for the side to move.
///
/// - With `movestogo`: `max_ms = inc + 2*(rem - overhead)/(2*mtg + 1)`, `early_ms = max_ms`.
/// - Sudden death (no `movestogo`): `max_ms = inc + (rem - overhead)/20`, `early_ms = 3*max_ms/4`.
///
/// Both are clamped to `rem - overhead`; if `rem <= overhead` a 10 ms floor is used.
pub fn compute_limits(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
) -> (Duration, Duration) {
    let rem_ms = remaining.as_millis() as f64;
    let inc_ms = increment.as_millis() as f64;

    if rem_ms <= OVERHEAD_MS {
        let floor = Duration::from_millis(10);
        return (floor, floor);
    }

    let usable = rem_ms - OVERHEAD_MS;

    let (max_ms, early_ms) = if let Some(mtg) = moves_to_go {
        let mtg = mtg.max(1) as f64;
        let max_ms = inc_ms + 2.0 * usable / (2.0 * mtg + 1.0);
        (max_ms, max_ms)
    } else {
        let max_ms = inc_ms + usable / 20.0;
        (max_ms, 3.0 * max_ms / 4.0)
    };

    let max_ms = max_ms.min(usable).max(1.0);
    let early_ms = early_ms.min(usable).max(1.0);

    (Duration::from_millis(max_ms as u64), Duration::from_millis(early_ms as u64))
}

/// Build a [`SearchControl`] from UCI `go` parameters and the side to move.
///
/// Priority order:
/// 1. `infinite: true` -> [`SearchControl::new_infinite`]
/// 2. `movetime: Some(d)` -> `max_ms = d - overhead`, `early_ms = max_ms`
/// 3. `nodes: Some(n)` -> [`SearchControl::new_nodes`]
/// 4. `wtime/btime` present -> [`compute_limits`] then [`SearchControl::new_timed`]
/// 5. `depth` only / bare `go` -> [`SearchControl::new_infinite`] (the depth
///    loop itself enforces the depth bound)
#[allow(clippy::too_many_arguments)]
pub fn limits_from_go(
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movestogo: Option<u32>,
    movetime: Option<Duration>,
    nodes: Option<u64>,
    infinite: bool,
    side: Color,
    stopped: Arc<AtomicBool>,
) -> SearchControl {
    let (remaining, increment) = match side {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    if infinite {
        return SearchControl::new_infinite(stopped);
    }

    if let Some(mt) = movetime {
        let mt_ms = (mt.as_millis() as f64 - OVERHEAD_MS).max(1.0) as u64;
        let max_ms = Duration::from_millis(mt_ms);
        return SearchControl::new_timed(stopped, max_ms, max_ms);
    }

    if let Some(max_nodes) = nodes {
        return SearchControl::new_nodes(stopped, max_nodes);
    }

    if let Some(rem) = remaining {
        let inc = increment.unwrap_or(Duration::ZERO);
        let (max, early) = compute_limits(rem, inc, movestogo);
        return SearchControl::new_timed(stopped, early, max);
    }

    SearchControl::new_infinite(stopped)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    use zugzwang_core::Color;

    use crate::time::compute_limits;
    use crate::time::limits_from_go;

    #[test]
    fn compute_limits_sudden_death() {
        let (max, early) = compute_limits(Duration::from_secs(300), Duration::from_secs(2), None);
        // usable = 300000 - 50 = 299950; max = 2000 + 299950/20 = 16997.5
        assert!(max.as_millis() > 15_000, "max={:?}", max);
        assert!(max.as_millis() < 20_000, "max={:?}", max);
        assert_eq!(early, Duration::from_millis((max.as_millis() as u64) * 3 / 4));
    }

    #[test]
    fn compute_limits_below_overhead_floors_to_10ms() {
        let (max, early) = compute_limits(Duration::from_millis(30), Duration::ZERO, None);
        assert_eq!(early, Duration::from_millis(10));
        assert_eq!(max, Duration::from_millis(10));
    }

    #[test]
    fn compute_limits_zero_remaining() {
        let (max, early) = compute_limits(Duration::ZERO, Duration::ZERO, None);
        assert_eq!(early, Duration::from_millis(10));
        assert_eq!(max, Duration::from_millis(10));
    }

    #[test]
    fn compute_limits_with_movestogo_equal_early_and_max() {
        let (max, early) = compute_limits(Duration::from_secs(60), Duration::ZERO, Some(10));
        assert_eq!(early, max);
        // usable = 59950; max = 2*59950/21 ~ 5709.5
        assert!(max.as_millis() > 4_000, "max={:?}", max);
        assert!(max.as_millis() < 8_000, "max={:?}", max);
    }

    #[test]
    fn limits_from_go_infinite() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control =
            limits_from_go(None, None, None, None, None, None, None, true, Color::White, stopped);
        assert!(!control.should_stop(10000));
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn limits_from_go_movetime() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            None,
            None,
            None,
            None,
            None,
            Some(Duration::from_secs(5)),
            None,
            false,
            Color::White,
            stopped,
        );
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn limits_from_go_with_clock() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            Some(Duration::from_secs(300)),
            Some(Duration::from_secs(300)),
            Some(Duration::from_secs(2)),
            Some(Duration::from_secs(2)),
            None,
            None,
            None,
            false,
            Color::White,
            stopped,
        );
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn limits_from_go_nodes() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            None,
            None,
            None,
            None,
            None,
            None,
            Some(4096),
            false,
            Color::White,
            stopped,
        );
        assert!(!control.should_stop(2048));
        assert!(control.should_stop(4096));
    }

    #[test]
    fn limits_from_go_depth_only() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            None, None, None, None, None, None, None, false, Color::White, stopped,
        );
        assert!(!control.should_stop(10000));
    }
}
