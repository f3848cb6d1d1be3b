use tracing::info;

use intentrank_core::types::BackoffPlan;

/// Slack below the floor that still counts as reaching it.
const FLOOR_EPSILON: f64 = 1e-9;

/// Thresholds tried by [`backoff`]: `start`, `start - step`, ... while
/// `>= floor`. `start` is always tried. A zero or non-finite step, or a
/// non-finite start or floor, yields `start` alone.
pub fn thresholds(plan: &BackoffPlan) -> impl Iterator<Item = f64> {
    let BackoffPlan { start, floor, step } = *plan;
    let step = step.abs();
    let relaxing = step > 0.0 && step.is_finite() && start.is_finite() && floor.is_finite();
    let rest = (1u32..)
        .map(move |i| start - f64::from(i) * step)
        .take_while(move |t| relaxing && t + FLOOR_EPSILON >= floor);
    std::iter::once(start).chain(rest)
}

/// Run `attempt` at each threshold of `plan` until it returns something.
/// Returns the first non-empty result, or the empty result of the last try.
pub fn backoff<T, F>(plan: &BackoffPlan, mut attempt: F) -> Vec<T>
where
    F: FnMut(f64) -> Vec<T>,
{
    let mut last = Vec::new();
    for threshold in thresholds(plan) {
        let hits = attempt(threshold);
        info!(threshold, hits = hits.len(), "backoff attempt");
        if !hits.is_empty() {
            return hits;
        }
        last = hits;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(start: f64, floor: f64, step: f64) -> BackoffPlan {
        BackoffPlan { start, floor, step }
    }

    #[test]
    fn default_plan_walks_down_to_zero() {
        let t: Vec<f64> = thresholds(&BackoffPlan::default()).collect();
        assert_eq!(t.len(), 11);
        assert_eq!(t[0], 0.5);
        assert!(t[10].abs() < 1e-12);
    }

    #[test]
    fn floor_is_reached_despite_rounding() {
        let t: Vec<f64> = thresholds(&plan(0.5, 0.1, 0.1)).collect();
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn negative_step_is_taken_by_magnitude() {
        let down: Vec<f64> = thresholds(&plan(0.3, 0.0, 0.1)).collect();
        let up: Vec<f64> = thresholds(&plan(0.3, 0.0, -0.1)).collect();
        assert_eq!(down, up);
    }

    #[test]
    fn degenerate_plans_try_start_once() {
        assert_eq!(thresholds(&plan(0.4, 0.0, 0.0)).collect::<Vec<_>>(), vec![0.4]);
        assert_eq!(thresholds(&plan(0.4, f64::NEG_INFINITY, 0.1)).count(), 1);
        assert_eq!(thresholds(&plan(0.1, 0.5, 0.1)).collect::<Vec<_>>(), vec![0.1]);
    }

    #[test]
    fn stops_at_first_hit() {
        let mut seen = Vec::new();
        let out = backoff(&plan(0.5, 0.0, 0.1), |t| {
            seen.push(t);
            if t < 0.25 { vec![t] } else { Vec::new() }
        });
        assert_eq!(seen.len(), 4);
        assert_eq!(out, vec![seen[3]]);
    }

    #[test]
    fn exhausted_plan_returns_empty() {
        let mut calls = 0;
        let out: Vec<u8> = backoff(&plan(0.5, 0.1, 0.1), |_| {
            calls += 1;
            Vec::new()
        });
        assert!(out.is_empty());
        assert_eq!(calls, 5);
    }
}
