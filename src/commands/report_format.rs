use crate::domain::quality::QualityVerdict;
use crate::services::simulation_types::{
    PortfolioOutput, SimulationOutput, SimulationPercentile, SimulationPercentiles,
};

pub fn format_simulation_report(output: &SimulationOutput) -> String {
    let report = &output.report;
    let mean_throughput = match report.mean_throughput {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    };

    let mut lines = Vec::new();
    lines.push("Simulation Report".to_string());
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Start date: {}", report.start_date));
    lines.push(format!("Period length: {} days", report.period_days));
    lines.push(format!("Trials: {}", report.trials));
    lines.push(format!("Seed: {}", report.seed));
    lines.push(format!("Backlog: {}", report.backlog));
    lines.push(format!("Mean throughput: {mean_throughput}"));
    lines.push(String::new());
    lines.push("Percentiles:".to_string());
    lines.extend(format_percentile_table(&report.percentiles));
    lines.extend(format_warnings(&output.warnings));

    lines.join("\n")
}

pub fn format_quality_report(data_source: &str, verdict: &QualityVerdict) -> String {
    let mut lines = Vec::new();
    lines.push("Throughput Quality Report".to_string());
    lines.push(format!("Data source: {data_source}"));
    lines.push(format!("Samples: {}", verdict.samples));
    lines.push(format!("Average: {:.2}", verdict.average));
    lines.push(format!("Average moving range: {:.2}", verdict.moving_range_average));
    lines.push(format!(
        "Natural process limits: {:.2} .. {:.2}",
        verdict.lower_limit, verdict.upper_limit
    ));
    lines.push(format!("Score: {}", verdict.score));
    lines.push(format!(
        "Predictable: {}",
        if verdict.is_predictable { "yes" } else { "no" }
    ));
    if !verdict.signals.is_empty() {
        lines.push(String::new());
        lines.push("Signals:".to_string());
        for signal in &verdict.signals {
            lines.push(format!("- {signal}"));
        }
    }

    lines.join("\n")
}

pub fn format_portfolio_report(output: &PortfolioOutput) -> String {
    let report = &output.report;

    let mut lines = Vec::new();
    lines.push("Portfolio Report".to_string());
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Start date: {}", report.start_date));
    lines.push(format!("Trials: {}", report.trials));
    lines.push(format!("Order: {}", report.order.join(" -> ")));
    for project in &output.projects {
        lines.push(String::new());
        let upstream = if project.upstream.is_empty() {
            String::new()
        } else {
            format!(" (after {})", project.upstream.join(", "))
        };
        lines.push(format!(
            "Project {}{upstream}: quality score {}",
            project.id, project.quality_score
        ));
        lines.extend(format_percentile_table(&project.adjusted));
    }
    lines.push(String::new());
    lines.push("Portfolio percentiles:".to_string());
    lines.extend(format_percentile_table(&report.percentiles));
    lines.extend(format_warnings(&output.warnings));

    lines.join("\n")
}

fn format_percentile_table(percentiles: &SimulationPercentiles) -> Vec<String> {
    let mut lines = vec![
        "Percentile | Periods | Date".to_string(),
        "-----------|---------|-----".to_string(),
    ];
    lines.extend(
        percentiles
            .rows()
            .into_iter()
            .map(|(label, percentile)| format_percentile_row(label, percentile)),
    );
    lines
}

fn format_percentile_row(label: &str, percentile: &SimulationPercentile) -> String {
    format!(
        "{label} | {periods:.2} | {date}",
        periods = percentile.periods,
        date = percentile.date.as_deref().unwrap_or("n/a")
    )
}

fn format_warnings(warnings: &[String]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Warnings:".to_string()];
    lines.extend(warnings.iter().map(|warning| format!("- {warning}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::DelayModel;
    use crate::domain::quality::{Signal, SignalKind};
    use crate::services::simulation_types::{PortfolioReport, ProjectReport, SimulationReport};

    fn percentiles() -> SimulationPercentiles {
        let row = |periods: f64, date: &str| SimulationPercentile {
            periods,
            date: Some(date.to_string()),
        };
        SimulationPercentiles {
            p10: row(3.0, "2026-02-23"),
            p50: row(4.5, "2026-03-09"),
            p85: row(6.0, "2026-03-16"),
            p90: row(6.25, "2026-03-23"),
            p95: row(7.0, "2026-03-23"),
        }
    }

    fn build_output() -> SimulationOutput {
        SimulationOutput {
            report: SimulationReport {
                data_source: "input.yaml".to_string(),
                start_date: "2026-02-02".to_string(),
                period_days: 7,
                backlog: 30.0,
                trials: 100,
                seed: 42,
                mean_throughput: Some(5.5),
                mean_periods: 4.8,
                non_converged_trials: 0,
                percentiles: percentiles(),
            },
            warnings: Vec::new(),
            trajectories: Vec::new(),
            results: Vec::new(),
        }
    }

    #[test]
    fn format_simulation_report_includes_header_and_table() {
        let output = format_simulation_report(&build_output());

        assert!(output.contains("Simulation Report"));
        assert!(output.contains("Data source: input.yaml"));
        assert!(output.contains("Start date: 2026-02-02"));
        assert!(output.contains("Trials: 100"));
        assert!(output.contains("Seed: 42"));
        assert!(output.contains("Mean throughput: 5.50"));
        assert!(output.contains("Percentile | Periods | Date"));
        assert!(output.contains("P10 | 3.00 | 2026-02-23"));
        assert!(output.contains("P50 | 4.50 | 2026-03-09"));
        assert!(output.contains("P85 | 6.00 | 2026-03-16"));
        assert!(output.contains("P95 | 7.00 | 2026-03-23"));
        assert!(!output.contains("Warnings:"));
    }

    #[test]
    fn format_simulation_report_lists_warnings() {
        let mut output = build_output();
        output.report.mean_throughput = None;
        output.warnings = vec!["3 trials did not complete within 100 periods".to_string()];

        let text = format_simulation_report(&output);
        assert!(text.contains("Mean throughput: n/a"));
        assert!(text.contains("Warnings:\n- 3 trials did not complete within 100 periods"));
    }

    #[test]
    fn format_quality_report_lists_signals() {
        let verdict = QualityVerdict {
            samples: 12,
            average: 5.0,
            moving_range_average: 1.0,
            upper_limit: 7.66,
            lower_limit: 2.34,
            signals: vec![Signal {
                kind: SignalKind::PointBeyondLimit,
                start: 4,
                end: 4,
            }],
            score: 85,
            is_predictable: false,
        };

        let output = format_quality_report("history.yaml", &verdict);

        assert!(output.contains("Natural process limits: 2.34 .. 7.66"));
        assert!(output.contains("Score: 85"));
        assert!(output.contains("Predictable: no"));
        assert!(output.contains("Signals:"));
    }

    #[test]
    fn format_portfolio_report_shows_projects_in_order() {
        let project = |id: &str, upstream: Vec<String>| ProjectReport {
            id: id.to_string(),
            backlog: 10.0,
            quality_score: 100,
            predictable: true,
            upstream,
            shift: 0.0,
            unconstrained: percentiles(),
            adjusted: percentiles(),
        };
        let output = PortfolioOutput {
            report: PortfolioReport {
                data_source: "portfolio.yaml".to_string(),
                start_date: "2026-02-02".to_string(),
                period_days: 7,
                trials: 500,
                delay_model: DelayModel::FinishToStart,
                confidence_percentile: 85.0,
                order: vec!["db".to_string(), "api".to_string()],
                percentiles: percentiles(),
            },
            projects: vec![project("db", Vec::new()), project("api", vec!["db".to_string()])],
            warnings: vec!["project api has unpredictable throughput (1 signals, score 85)".to_string()],
        };

        let text = format_portfolio_report(&output);

        assert!(text.contains("Order: db -> api"));
        assert!(text.contains("Project db: quality score 100"));
        assert!(text.contains("Project api (after db): quality score 100"));
        assert!(text.contains("Portfolio percentiles:"));
        assert!(text.contains("- project api has unpredictable throughput"));
    }
}
