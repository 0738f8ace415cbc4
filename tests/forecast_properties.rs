use delivery_forecast::domain::portfolio::DelayModel;
use delivery_forecast::domain::quality::SignalKind;
use delivery_forecast::{
    DependencyEdge, PortfolioSettings, ProjectInput, SimulationConfig, ThroughputSeries, analyze,
    simulate, simulate_portfolio, validate, would_introduce_cycle,
};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn series(values: &[u32]) -> ThroughputSeries {
    ThroughputSeries::new(values.iter().map(|value| f64::from(*value)).collect()).unwrap()
}

fn fractional_series(values: &[f64]) -> ThroughputSeries {
    ThroughputSeries::new(values.to_vec()).unwrap()
}

/// Acyclic edge sets: a project only ever depends on one with a smaller
/// index.
fn acyclic_edges() -> impl Strategy<Value = Vec<DependencyEdge>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(from, to)| to < from)
            .map(|(from, to)| DependencyEdge::new(NAMES[from], NAMES[to]))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn percentiles_are_ordered(
        values in prop::collection::vec(1u32..20, 1..15),
        backlog in 0u32..120,
        trials in 1usize..200,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig::new(f64::from(backlog)).with_trials(trials).with_seed(seed);
        let distribution = simulate(&series(&values), &config).unwrap();
        prop_assert!(distribution.percentiles().is_ordered(), "{:?}", distribution.percentiles());
        prop_assert_eq!(distribution.trials(), trials);
    }

    #[test]
    fn zero_backlog_is_degenerate(
        values in prop::collection::vec(0u32..20, 1..15),
        trials in 1usize..100,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig::new(0.0).with_trials(trials).with_seed(seed);
        let distribution = simulate(&series(&values), &config).unwrap();
        prop_assert!(distribution.completion_times().iter().all(|time| *time == 0.0));
    }

    #[test]
    fn constant_throughput_needs_ceil_of_backlog_over_rate(
        rate in 1u32..10,
        backlog in 0u32..200,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig::new(f64::from(backlog)).with_trials(20).with_seed(seed);
        let distribution = simulate(&series(&[rate; 5]), &config).unwrap();
        let expected = f64::from(backlog.div_ceil(rate));
        prop_assert!(distribution.completion_times().iter().all(|time| *time == expected));
    }

    #[test]
    fn quality_score_is_bounded_and_consistent(
        values in prop::collection::vec(0u32..50, 1..60),
    ) {
        let verdict = analyze(&series(&values)).unwrap();
        prop_assert!(verdict.score <= 100);
        prop_assert_eq!(verdict.is_predictable, verdict.signals.is_empty());
        prop_assert!(verdict.lower_limit >= 0.0);
        prop_assert!(verdict.lower_limit <= verdict.upper_limit);
        if verdict.is_predictable && values.len() >= 10 {
            prop_assert_eq!(verdict.score, 100);
        }
    }

    #[test]
    fn injected_spike_is_always_beyond_the_limits(
        base in prop::collection::vec(4u32..=6, 20),
        position in 0usize..20,
    ) {
        let mut values = base;
        values[position] = 1_000;
        let verdict = analyze(&series(&values)).unwrap();
        let flagged = verdict
            .signals
            .iter()
            .any(|signal| signal.kind == SignalKind::PointBeyondLimit && signal.start == position);
        prop_assert!(flagged, "spike at {} not flagged: {:?}", position, verdict.signals);
    }

    #[test]
    fn fractional_score_is_bounded_and_consistent(
        values in prop::collection::vec(0.0f64..50.0, 1..60),
    ) {
        let verdict = analyze(&fractional_series(&values)).unwrap();
        prop_assert!(verdict.score <= 100);
        prop_assert_eq!(verdict.is_predictable, verdict.signals.is_empty());
        prop_assert!(verdict.lower_limit <= verdict.upper_limit);
    }

    #[test]
    fn constant_fractional_series_is_predictable(
        value in 0.0f64..100.0,
        len in 10usize..60,
    ) {
        let verdict = analyze(&fractional_series(&vec![value; len])).unwrap();
        prop_assert!(verdict.is_predictable, "{} x {}: {:?}", value, len, verdict.signals);
        prop_assert_eq!(verdict.score, 100);
    }

    #[test]
    fn cycle_check_agrees_with_validation_and_leaves_edges_alone(
        edges in acyclic_edges(),
        from in 0..NAMES.len(),
        to in 0..NAMES.len(),
    ) {
        prop_assert!(validate(&edges).is_ok());
        let candidate = DependencyEdge::new(NAMES[from], NAMES[to]);
        let before = edges.clone();

        let introduces = would_introduce_cycle(&edges, &candidate);

        prop_assert_eq!(&edges, &before);
        let mut extended = edges.clone();
        extended.push(candidate);
        prop_assert_eq!(introduces, validate(&extended).is_err());
        prop_assert_eq!(validate(&edges).unwrap(), validate(&before).unwrap());
    }

    #[test]
    fn adjusted_percentiles_never_precede_upstream(
        histories in prop::collection::vec(prop::collection::vec(1u32..10, 3..8), 2..5),
        links in prop::collection::vec((0usize..5, 0usize..5), 0..6),
        finish_to_finish in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let projects: Vec<ProjectInput> = histories
            .iter()
            .enumerate()
            .map(|(index, values)| ProjectInput::new(NAMES[index], series(values), 15.0 + index as f64))
            .collect();
        // Only later projects depend on earlier ones, so the graph is acyclic.
        let edges: Vec<DependencyEdge> = links
            .into_iter()
            .filter(|(later, earlier)| later < &projects.len() && earlier < later)
            .map(|(later, earlier)| DependencyEdge::new(NAMES[later], NAMES[earlier]))
            .collect();
        let settings = PortfolioSettings {
            trials: 100,
            seed: Some(seed),
            delay_model: if finish_to_finish { DelayModel::FinishToFinish } else { DelayModel::FinishToStart },
            ..PortfolioSettings::default()
        };

        let forecast = simulate_portfolio(&projects, &edges, &settings).unwrap();

        for project in forecast.projects() {
            let levels = project.adjusted.percentiles().as_levels();
            prop_assert!(project.adjusted.percentiles().is_ordered());
            for dependency in project.adjusted.upstream() {
                let upstream = forecast.project(dependency).unwrap().adjusted.percentiles().as_levels();
                for (down, up) in levels.iter().zip(upstream.iter()) {
                    prop_assert!(down >= up);
                }
            }
            for (total, level) in forecast.percentiles().as_levels().iter().zip(levels.iter()) {
                prop_assert!(total >= level);
            }
        }
    }
}
