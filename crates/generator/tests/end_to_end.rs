//! End-to-end trajectory generation across the three schemes

use approx::assert_relative_eq;
use tranche_core::{
    EvolutionParameters, ImpactSpec, LinearImpact, LinearImpactParameters, MarketCore,
    MeanVarianceObjective, OrderSpecification, PowerLawImpact, PowerLawImpactParameters,
};
use tranche_dynamics::{PathSimulator, TrajectoryControl};
use tranche_generator::{
    Ac2000Generator, Almgren2003Generator, NumericalGenerator, TrajectoryCharacteristics,
    TrajectoryGenerator, trajectory_moments,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario_control() -> TrajectoryControl {
    TrajectoryControl::fixed_interval(OrderSpecification::new(100_000.0, 5.0).unwrap(), 10).unwrap()
}

fn scenario_params() -> EvolutionParameters {
    EvolutionParameters::from_specs(
        MarketCore::driftless(1.0).unwrap(),
        &ImpactSpec::zero(),
        &ImpactSpec::Linear {
            offset: 0.0,
            slope: 5e-6,
        },
        &ImpactSpec::zero(),
        Some(&ImpactSpec::zero()),
    )
    .unwrap()
}

#[test]
fn test_linear_liquidation_scenario() {
    init_logger();
    let control = scenario_control();
    let objective = MeanVarianceObjective::new(1e-5).unwrap();
    let trajectory = NumericalGenerator::new(scenario_params())
        .generate(&control, &objective)
        .unwrap();

    let holdings = trajectory.holdings();
    assert_eq!(holdings.len(), 11);
    assert_eq!(holdings[0], 100_000.0);
    assert_eq!(holdings[10], 0.0);
    for pair in holdings.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    assert!(trajectory.is_monotone());

    let expectation = trajectory.transaction_cost_expectation();
    assert!(expectation.is_finite());
    assert!(expectation > 0.0);

    let TrajectoryCharacteristics::Numerical { converged, .. } = *trajectory.characteristics() else {
        panic!("expected numerical characteristics");
    };
    assert!(converged);
}

#[test]
fn test_numerical_matches_discrete_closed_form() {
    init_logger();
    let linear = LinearImpactParameters::new(
        MarketCore::new(0.02, 0.95, 0.0).unwrap(),
        LinearImpact::slope_only(2.5e-7).unwrap(),
        LinearImpact::slope_only(2.5e-6).unwrap(),
    )
    .unwrap();
    let control =
        TrajectoryControl::fixed_interval(OrderSpecification::new(1e6, 5.0).unwrap(), 10).unwrap();
    let objective = MeanVarianceObjective::new(2e-6).unwrap();

    let closed_form = Ac2000Generator::new(linear).generate(&control, &objective).unwrap();
    let numerical = NumericalGenerator::new(linear.evolution_parameters().unwrap())
        .generate(&control, &objective)
        .unwrap();

    for (n, c) in numerical.holdings().iter().zip(closed_form.holdings()) {
        assert_relative_eq!(*n, *c, max_relative = 1e-6, epsilon = 1e-3);
    }
    assert_relative_eq!(
        numerical.objective_value(&objective),
        closed_form.objective_value(&objective),
        max_relative = 1e-9
    );
    assert_relative_eq!(
        numerical.transaction_cost_expectation(),
        closed_form.transaction_cost_expectation(),
        max_relative = 1e-6
    );
}

#[test]
fn test_power_law_closed_form_moments_through_engine() {
    init_logger();
    // With k = 1 the sampled exponential is a feasible schedule for the engine;
    // its discrete cost cannot beat the numerical optimum on the same nodes.
    let params = PowerLawImpactParameters::new(
        1.0,
        LinearImpact::zero(),
        PowerLawImpact::new(5e-6, 1.0).unwrap(),
    )
    .unwrap();
    let control = scenario_control();
    let objective = MeanVarianceObjective::new(1e-5).unwrap();

    let continuous = Almgren2003Generator::new(params).generate(&control, &objective).unwrap();
    let mut sampled = continuous.holdings().to_vec();
    if let Some(last) = sampled.last_mut() {
        *last = 0.0;
    }

    let evolution = params.evolution_parameters().unwrap();
    let sampled_moments = trajectory_moments(&evolution, &control, &sampled).unwrap();
    let optimum = NumericalGenerator::new(evolution)
        .generate(&control, &objective)
        .unwrap();

    assert!(
        optimum.objective_value(&objective)
            <= objective.evaluate(
                sampled_moments.expectation.value(),
                sampled_moments.variance.value()
            ) + 1e-9
    );
}

#[test]
fn test_simulated_shortfall_matches_analytic_moments() {
    init_logger();
    let params = scenario_params();
    let control = scenario_control();
    let objective = MeanVarianceObjective::new(1e-5).unwrap();
    let trajectory = NumericalGenerator::new(scenario_params())
        .generate(&control, &objective)
        .unwrap();

    let slices = control.slices(trajectory.holdings()).unwrap();
    let statistics = PathSimulator::new(&params, 50.0)
        .unwrap()
        .simulate_many(&slices, 4000, 7)
        .unwrap();

    assert_eq!(statistics.paths, 4000);
    assert!(
        (statistics.mean - trajectory.transaction_cost_expectation()).abs()
            < 5.0 * statistics.standard_error()
    );
    assert_relative_eq!(
        statistics.variance,
        trajectory.transaction_cost_variance(),
        max_relative = 0.15
    );
}
