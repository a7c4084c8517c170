use serde::Serialize;
use std::collections::BTreeMap;

use aotai_game::numbers::i64_to_f64;

use super::policy::GameplayStrategy;
use super::runner::RunRecord;

/// Per-strategy rollup of many seeded runs.
#[derive(Debug, Clone, Serialize)]
pub struct PlayabilityAggregate {
    pub strategy: GameplayStrategy,
    pub iterations: usize,
    pub survival_rate: f64,
    pub outcomes: BTreeMap<String, usize>,
    pub mean_days: f64,
    pub std_days: f64,
    pub mean_distance_km: f64,
    pub std_distance_km: f64,
    pub mean_money_left: f64,
    pub mean_commands: f64,
    pub rejection_rate: f64,
    pub mean_events: f64,
    pub coldest_temp: f64,
    pub failed_runs: usize,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Group records by strategy, in strategy order.
#[must_use]
pub fn aggregate_playability(records: &[RunRecord]) -> Vec<PlayabilityAggregate> {
    let mut grouped: BTreeMap<GameplayStrategy, Vec<&RunRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.strategy).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(strategy, runs)| {
            let n = runs.len();
            let days: Vec<f64> = runs.iter().map(|r| f64::from(r.days_survived)).collect();
            let distance: Vec<f64> = runs.iter().map(|r| r.distance_km).collect();
            let money: Vec<f64> = runs.iter().map(|r| i64_to_f64(r.money_left)).collect();
            let commands: usize = runs.iter().map(|r| r.commands).sum();
            let rejections: usize = runs.iter().map(|r| r.rejections).sum();
            let events: usize = runs.iter().map(|r| r.events_seen).sum();

            let mut outcomes = BTreeMap::new();
            for run in &runs {
                *outcomes.entry(run.outcome.label()).or_insert(0) += 1;
            }
            let (mean_days, std_days) = mean_std(&days);
            let (mean_distance_km, std_distance_km) = mean_std(&distance);

            PlayabilityAggregate {
                strategy,
                iterations: n,
                survival_rate: ratio(runs.iter().filter(|r| r.survived()).count(), n),
                outcomes,
                mean_days,
                std_days,
                mean_distance_km,
                std_distance_km,
                mean_money_left: mean_std(&money).0,
                mean_commands: ratio(commands, n),
                rejection_rate: ratio(rejections, commands),
                mean_events: ratio(events, n),
                coldest_temp: runs
                    .iter()
                    .map(|r| r.lowest_temp)
                    .fold(f64::INFINITY, f64::min),
                failed_runs: runs.iter().filter(|r| !r.passed()).count(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::runner::RunOutcome;
    use aotai_game::Ending;
    use std::time::Duration;

    fn record(strategy: GameplayStrategy, outcome: RunOutcome, days: u32) -> RunRecord {
        RunRecord {
            strategy,
            seed: 1,
            outcome,
            rank: None,
            days_survived: days,
            distance_km: f64::from(days) * 10.0,
            lowest_temp: 36.0 - f64::from(days),
            lowest_sanity: 80.0,
            max_altitude: 3_000.0,
            money_left: 100,
            commands: 40,
            rejections: 4,
            events_seen: 2,
            rng_draws: 0,
            violations: Vec::new(),
            recent_decisions: Vec::new(),
            duration: Duration::from_millis(3),
            fingerprint: String::new(),
        }
    }

    #[test]
    fn aggregates_group_by_strategy() {
        let records = vec![
            record(
                GameplayStrategy::Balanced,
                RunOutcome::Ended(Ending::Victory),
                2,
            ),
            record(
                GameplayStrategy::Balanced,
                RunOutcome::Ended(Ending::Hypothermia),
                4,
            ),
            record(GameplayStrategy::Cautious, RunOutcome::Stalled, 1),
        ];
        let aggregates = aggregate_playability(&records);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].strategy, GameplayStrategy::Cautious);

        let balanced = &aggregates[1];
        assert_eq!(balanced.iterations, 2);
        assert!((balanced.survival_rate - 0.5).abs() < f64::EPSILON);
        assert!((balanced.mean_days - 3.0).abs() < f64::EPSILON);
        assert!((balanced.std_days - 1.0).abs() < f64::EPSILON);
        assert!((balanced.rejection_rate - 0.1).abs() < 1e-12);
        assert!((balanced.coldest_temp - 32.0).abs() < f64::EPSILON);
        assert_eq!(balanced.outcomes.get("hypothermia"), Some(&1));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(aggregate_playability(&[]).is_empty());
    }
}
