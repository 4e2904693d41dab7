//! Composite 0-100 performance score.
//!
//! Three additive parts: how deep the user got (50), how well-paced the
//! repetitions were (20) and how even they were (30).

const LEVEL_WEIGHT: f64 = 50.0;
const PACING_WEIGHT: f64 = 20.0;
const CONSISTENCY_WEIGHT: f64 = 30.0;

/// Repetitions faster than this are rushed.
const FAST_PACE_SECS: f64 = 2.0;
/// Repetitions slower than this are dragging.
const SLOW_PACE_SECS: f64 = 6.0;

/// The score split into its components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// 0-50.
    pub level: f64,
    /// 0-20.
    pub pacing: f64,
    /// 0-30.
    pub consistency: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        (self.level + self.pacing + self.consistency)
            .round()
            .clamp(0.0, 100.0) as u8
    }
}

pub fn performance_score(reached_levels: u32, max_levels: u32, repetition_secs: &[f64]) -> u8 {
    score_breakdown(reached_levels, max_levels, repetition_secs).total()
}

pub fn score_breakdown(
    reached_levels: u32,
    max_levels: u32,
    repetition_secs: &[f64],
) -> ScoreBreakdown {
    let times: Vec<f64> = repetition_secs
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .collect();

    ScoreBreakdown {
        level: level_component(reached_levels, max_levels),
        pacing: pacing_component(&times),
        consistency: consistency_component(&times),
    }
}

fn level_component(reached_levels: u32, max_levels: u32) -> f64 {
    if max_levels == 0 {
        return 0.0;
    }
    let ratio = (reached_levels as f64 / max_levels as f64).min(1.0);
    LEVEL_WEIGHT * ratio
}

fn pacing_component(times: &[f64]) -> f64 {
    let Some(avg) = mean(times) else {
        return 0.0;
    };
    if avg < FAST_PACE_SECS {
        PACING_WEIGHT * avg / FAST_PACE_SECS
    } else if avg > SLOW_PACE_SECS {
        PACING_WEIGHT * SLOW_PACE_SECS / avg
    } else {
        // Full marks at the fast edge, falling to zero at the slow edge.
        PACING_WEIGHT * (1.0 - (avg - FAST_PACE_SECS) / (SLOW_PACE_SECS - FAST_PACE_SECS))
    }
}

fn consistency_component(times: &[f64]) -> f64 {
    if times.len() < 2 {
        return CONSISTENCY_WEIGHT;
    }
    let Some(avg) = mean(times) else {
        return CONSISTENCY_WEIGHT;
    };
    let variance = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / times.len() as f64;
    let std_dev = variance.sqrt();
    let normalized = if avg > 0.0 {
        (std_dev / avg).clamp(0.0, 1.0)
    } else {
        0.0
    };
    CONSISTENCY_WEIGHT * (1.0 - normalized)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_run_scores_100() {
        let breakdown = score_breakdown(5, 5, &[2.0, 2.0, 2.0]);
        assert!((breakdown.level - 50.0).abs() < 1e-9);
        assert!((breakdown.pacing - 20.0).abs() < 1e-9);
        assert!((breakdown.consistency - 30.0).abs() < 1e-9);
        assert_eq!(breakdown.total(), 100);
    }

    #[test]
    fn no_repetitions() {
        let breakdown = score_breakdown(0, 5, &[]);
        assert_eq!(breakdown.level, 0.0);
        assert_eq!(breakdown.pacing, 0.0);
        assert_eq!(breakdown.consistency, 30.0);
        assert_eq!(breakdown.total(), 30);
    }

    #[test]
    fn rushed_reps_lose_pacing() {
        let breakdown = score_breakdown(5, 5, &[1.0, 1.0]);
        assert!((breakdown.pacing - 10.0).abs() < 1e-9);
    }

    #[test]
    fn slow_reps_lose_pacing() {
        let breakdown = score_breakdown(5, 5, &[12.0]);
        assert!((breakdown.pacing - 10.0).abs() < 1e-9);
    }

    #[test]
    fn interior_pace_falls_to_zero_at_slow_edge() {
        assert!((score_breakdown(1, 1, &[4.0]).pacing - 10.0).abs() < 1e-9);
        assert!(score_breakdown(1, 1, &[6.0]).pacing.abs() < 1e-9);
    }

    #[test]
    fn uneven_reps_lose_consistency() {
        // mean 3, population std dev 1, cv 1/3.
        let breakdown = score_breakdown(2, 4, &[2.0, 4.0]);
        assert!((breakdown.consistency - 20.0).abs() < 1e-9);
        assert!((breakdown.level - 25.0).abs() < 1e-9);
    }

    #[test]
    fn huge_spread_clamps_consistency_at_zero() {
        let breakdown = score_breakdown(3, 3, &[0.1, 0.1, 50.0]);
        assert!(breakdown.consistency >= 0.0);
    }

    #[test]
    fn score_stays_in_bounds() {
        let cases: Vec<(u32, u32, Vec<f64>)> = vec![
            (0, 0, vec![]),
            (9, 3, vec![2.0]),
            (5, 5, vec![0.0, 0.0]),
            (5, 5, vec![f64::NAN, 3.0]),
            (1, 8, vec![1000.0, 0.001]),
            (8, 8, vec![2.0, 6.0, 2.0, 6.0]),
        ];
        for (reached, max, times) in cases {
            let score = performance_score(reached, max, &times);
            assert!(score <= 100, "score {score} for {reached}/{max} {times:?}");
        }
    }
}
