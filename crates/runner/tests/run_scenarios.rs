//! Configured runs for each scheme

use approx::assert_relative_eq;
use tranche_generator::TrajectoryCharacteristics;
use tranche_runner::{RunError, load_config_from_str, load_default_config, run};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_default_scenario_report() {
    init_logger();
    let config = load_default_config().unwrap();
    let report = run(&config).unwrap();

    assert_eq!(report.scheme, "numerical");
    let holdings = report.trajectory.holdings();
    assert_eq!(holdings.first(), Some(&100_000.0));
    assert_eq!(holdings.last(), Some(&0.0));
    assert!(report.trajectory.is_monotone());
    assert!(report.trajectory.transaction_cost_expectation() > 0.0);

    let simulation = report.simulation.unwrap();
    assert_eq!(simulation.statistics.paths, 1000);
    assert!(simulation.mean_z_score.abs() < 5.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trajectory"]["characteristics"]["scheme"], "numerical");
    assert_eq!(json["trajectory"]["holdings"].as_array().unwrap().len(), 11);
}

#[test]
fn test_power_law_run_reports_sentinels_as_null() {
    init_logger();
    let config = load_config_from_str(
        r#"{
            "order": { "start_holdings": 100000.0, "finish_time": 5.0 },
            "risk_aversion": 1e-5,
            "market_core": { "volatility": 1.0 },
            "scheme": {
                "kind": "almgren_2003",
                "temporary": { "kind": "power_law", "constant": 5e-6, "exponent": 1.0 }
            }
        }"#,
    )
    .unwrap();
    let report = run(&config).unwrap();

    assert_eq!(report.scheme, "almgren_2003");
    let TrajectoryCharacteristics::PowerLaw {
        characteristic_time,
        ..
    } = *report.trajectory.characteristics()
    else {
        panic!("expected power-law characteristics");
    };
    assert_relative_eq!(characteristic_time, 0.5_f64.sqrt(), max_relative = 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    let characteristics = &json["trajectory"]["characteristics"];
    assert_eq!(characteristics["scheme"], "power_law");
    assert!(characteristics["maximum_execution_time"].is_null());
    assert!(characteristics["characteristic_size"].is_null());
    assert!(json.get("simulation").is_none());
}

#[test]
fn test_closed_form_outside_validity_is_execution_error() {
    init_logger();
    let config = load_config_from_str(
        r#"{
            "order": { "start_holdings": 1000.0, "finish_time": 1.0 },
            "intervals": 4,
            "risk_aversion": 0.0,
            "market_core": { "drift": 0.1, "volatility": 0.5 },
            "scheme": {
                "kind": "ac2000",
                "temporary": { "kind": "linear", "slope": 1e-4 }
            }
        }"#,
    )
    .unwrap();
    assert!(matches!(run(&config), Err(RunError::Execution(_))));
}

#[test]
fn test_linear_trading_enhanced_run() {
    init_logger();
    let config = load_config_from_str(
        r#"{
            "order": { "start_holdings": 100000.0, "finish_time": 5.0 },
            "risk_aversion": 1e-5,
            "market_core": { "volatility": 1.0 },
            "scheme": {
                "kind": "linear_trading_enhanced",
                "temporary": { "kind": "linear", "slope": 5e-6 },
                "temporary_volatility": { "kind": "linear", "offset": 0.0, "slope": 1e-6 }
            }
        }"#,
    )
    .unwrap();
    let report = run(&config).unwrap();

    assert_eq!(report.scheme, "linear_trading_enhanced");
    let TrajectoryCharacteristics::TradingEnhanced {
        characteristic_size,
        converged,
        ..
    } = *report.trajectory.characteristics()
    else {
        panic!("expected trading-enhanced characteristics");
    };
    assert!(converged);
    assert_relative_eq!(characteristic_size, 5e5, max_relative = 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trajectory"]["characteristics"]["scheme"], "trading_enhanced");
}
