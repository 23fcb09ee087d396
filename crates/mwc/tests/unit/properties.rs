//! Property tests of the model densities through the public API.

use mwc::{
    CalibrationInput, DeviationSupport, HierarchicalCalibration, LogDensity, ThermoInput,
    ThermoModel, ThermoParams,
};
use mwc_core::calibration::non_centered;
use mwc_core::density::partition_lpdf;
use proptest::prelude::*;

fn thermo_input(repressors: Vec<f64>) -> ThermoInput {
    let n = repressors.len();
    ThermoInput {
        j: 3,
        n,
        temps: vec![20.0, 30.0, 42.0],
        idx: (0..n).map(|i| (i % 3 + 1) as i64).collect(),
        n_ns: 4.6e6,
        foldchange: vec![0.5; n],
        repressors,
    }
}

proptest! {
    #[test]
    fn unrepressed_prediction_is_exactly_zero(
        del_h in 1e-3f64..1e6,
        del_s in 1e-3f64..1e3,
        epsilon in -50.0f64..50.0,
    ) {
        let model = ThermoModel::from_input(&thermo_input(vec![0.0; 6])).unwrap();
        let params = ThermoParams { sigma: 0.2, epsilon, del_h, del_s };
        for mu in model.predicted_log_fold_change(&params) {
            prop_assert_eq!(mu, 0.0);
        }
    }

    #[test]
    fn unrepressed_density_is_finite_on_every_level(
        del_h in 1e-3f64..1e5,
        del_s in 1e-3f64..1e2,
        sigma in 1e-3f64..2.0,
    ) {
        let model = ThermoModel::from_input(&thermo_input(vec![0.0; 3])).unwrap();
        let lp = model.log_density(&[sigma, -12.0, del_h, del_s]);
        prop_assert!(lp.is_finite(), "log-density {} not finite", lp);
    }

    #[test]
    fn partition_density_is_symmetric(
        i1 in 0.0f64..1e5,
        i2 in 0.0f64..1e5,
        alpha in 1e-2f64..1e3,
    ) {
        prop_assert_eq!(partition_lpdf(i1, i2, alpha), partition_lpdf(i2, i1, alpha));
    }

    #[test]
    fn calibration_factors_positive_in_support(
        mu in 1e-6f64..4096.0,
        tau in 0.0f64..100.0,
        raw in proptest::collection::vec(0.0f64..10.0, 3),
    ) {
        let input = CalibrationInput {
            j1: 1,
            j2: 3,
            n: 3,
            index_1: vec![1, 1, 1],
            index_2: vec![1, 2, 3],
            i_1: vec![500.0, 800.0, 1200.0],
            i_2: vec![450.0, 900.0, 1000.0],
        };
        let model = HierarchicalCalibration::from_input(&input)
            .unwrap()
            .with_support(DeviationSupport::NonNegative);
        let mut theta = vec![mu, tau];
        theta.extend(&raw);
        for (alpha, r) in model.calibration_factors(&theta).unwrap().iter().zip(&raw) {
            prop_assert!(*alpha > 0.0);
            prop_assert_eq!(*alpha, non_centered(mu, tau, *r));
        }
    }
}
