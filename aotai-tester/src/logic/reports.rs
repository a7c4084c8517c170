use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use aotai_game::numbers::{floor_f64_to_u32, round_f64_to_i32};

use super::playability::PlayabilityAggregate;
use super::runner::RunRecord;

fn percent(rate: f64) -> i32 {
    round_f64_to_i32(rate * 100.0)
}

pub fn generate_console_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[PlayabilityAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Playthrough Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for aggregate in aggregates {
        let status = if aggregate.failed_runs == 0 {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{status} {}", aggregate.strategy.label().bold())?;
        writeln!(
            out,
            "   Runs: {} | survived {}% | days {:.1} ± {:.1} | {:.1} km ± {:.1}",
            aggregate.iterations,
            percent(aggregate.survival_rate),
            aggregate.mean_days,
            aggregate.std_days,
            aggregate.mean_distance_km,
            aggregate.std_distance_km
        )?;
        writeln!(
            out,
            "   Commands/run: {} | rejected {}% | events/run {:.1} | coldest {:.1}°C",
            floor_f64_to_u32(aggregate.mean_commands),
            percent(aggregate.rejection_rate),
            aggregate.mean_events,
            aggregate.coldest_temp
        )?;
        let outcomes: Vec<String> = aggregate
            .outcomes
            .iter()
            .map(|(label, count)| format!("{label} ×{count}"))
            .collect();
        writeln!(out, "   Outcomes: {}", outcomes.join(", "))?;
    }

    let failures: Vec<&RunRecord> = records.iter().filter(|r| !r.passed()).collect();
    if !failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "🚨 Invariant Violations".bright_red().bold())?;
        writeln!(out, "{}", "======================".red())?;
        for record in failures {
            writeln!(
                out,
                "{} seed {} ({})",
                record.strategy.label().bold(),
                record.seed,
                record.outcome.label()
            )?;
            for violation in &record.violations {
                writeln!(out, "     • {}", violation.red())?;
            }
        }
    }

    if let (Some(fastest), Some(slowest)) = (
        records.iter().min_by_key(|r| r.duration),
        records.iter().max_by_key(|r| r.duration),
    ) {
        writeln!(out)?;
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} seed {} ({:?})",
            fastest.strategy.label().green(),
            fastest.seed,
            fastest.duration
        )?;
        writeln!(
            out,
            "Slowest: {} seed {} ({:?})",
            slowest.strategy.label().yellow(),
            slowest.seed,
            slowest.duration
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    runs: &'a [RunRecord],
    strategies: &'a [PlayabilityAggregate],
}

pub fn generate_json_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[PlayabilityAggregate],
) -> Result<()> {
    let report = JsonReport {
        runs: records,
        strategies: aggregates,
    };
    let json_output = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    aggregates: &[PlayabilityAggregate],
) -> Result<()> {
    writeln!(out, "# Aotai Playthrough Results\n")?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", total - passed)?;

    writeln!(out, "## Strategies\n")?;
    writeln!(
        out,
        "| Strategy | Runs | Survived | Mean days | Mean km | Rejected | Failed |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for aggregate in aggregates {
        writeln!(
            out,
            "| {} | {} | {}% | {:.1} | {:.1} | {}% | {} |",
            aggregate.strategy.label(),
            aggregate.iterations,
            percent(aggregate.survival_rate),
            aggregate.mean_days,
            aggregate.mean_distance_km,
            percent(aggregate.rejection_rate),
            aggregate.failed_runs
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Runs\n")?;
    for record in records {
        let status = if record.passed() { "✅" } else { "❌" };
        writeln!(
            out,
            "### {status} {} seed {}\n",
            record.strategy.label(),
            record.seed
        )?;
        writeln!(out, "- **Outcome**: {}", record.outcome.label())?;
        if let Some(rank) = record.rank {
            writeln!(out, "- **Rank**: {}", rank.as_str())?;
        }
        writeln!(
            out,
            "- **Days**: {} | **Distance**: {:.1} km | **Commands**: {}",
            record.days_survived, record.distance_km, record.commands
        )?;
        if !record.violations.is_empty() {
            writeln!(out, "- **Violations**:")?;
            for violation in &record.violations {
                writeln!(out, "  - {violation}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, records: &[RunRecord]) -> Result<()> {
    writeln!(
        out,
        "strategy,seed,outcome,rank,days,distance_km,lowest_temp,money_left,commands,rejections,events,violations"
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{:.2},{:.2},{},{},{},{},{}",
            record.strategy.label(),
            record.seed,
            record.outcome.label(),
            record.rank.map_or("", |rank| rank.as_str()),
            record.days_survived,
            record.distance_km,
            record.lowest_temp,
            record.money_left,
            record.commands,
            record.rejections,
            record.events_seen,
            record.violations.len()
        )?;
    }
    Ok(())
}
