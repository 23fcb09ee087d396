//! Hierarchical calibration model fitted to two experiments.

use mwc::{
    fit_calibration, CalibrationInput, DeviationSupport, HierarchicalCalibration, Inference,
    SingleCalibration,
};

/// Sibling pairs whose squared difference equals `alpha` times their total,
/// the fluctuation-method relation for calibration factor `alpha`.
fn sibling_pairs(alpha: f64, pairs: usize) -> (Vec<f64>, Vec<f64>) {
    (0..pairs)
        .map(|k| {
            let total = 20_000.0 + 100.0 * k as f64;
            let d = (alpha * total).sqrt();
            let (bright, dim) = ((total + d) / 2.0, (total - d) / 2.0);
            if k % 2 == 0 {
                (bright, dim)
            } else {
                (dim, bright)
            }
        })
        .unzip()
}

/// One growth condition, experiment 1 at α = 100 and experiment 2 at α = 150.
fn two_experiment_input(pairs: usize) -> CalibrationInput {
    let (mut i_1, mut i_2) = sibling_pairs(100.0, pairs);
    let (a, b) = sibling_pairs(150.0, pairs);
    i_1.extend(a);
    i_2.extend(b);
    let mut index_2 = vec![1; pairs];
    index_2.extend(vec![2; pairs]);
    CalibrationInput {
        j1: 1,
        j2: 2,
        n: 2 * pairs,
        index_1: vec![1, 1],
        index_2,
        i_1,
        i_2,
    }
}

#[test]
fn group_mean_lies_between_experiments() {
    let model = HierarchicalCalibration::from_input(&two_experiment_input(1_000))
        .unwrap()
        .with_support(DeviationSupport::Unbounded);
    let map = Inference::new().optimize(&model).unwrap();

    let alpha_mu = map.get("alpha_mu[1]").unwrap();
    let tau = map.get("tau").unwrap();
    let alpha_1 = map.get("alpha[1]").unwrap();
    let alpha_2 = map.get("alpha[2]").unwrap();

    assert!(
        alpha_mu > 100.0 && alpha_mu < 150.0,
        "alpha_mu = {}",
        alpha_mu
    );
    assert!(tau > 0.0, "tau = {}", tau);
    assert!(alpha_1 < alpha_2, "alpha = [{}, {}]", alpha_1, alpha_2);
    // experiments are shrunk toward the group mean, never past it
    assert!(alpha_1 < alpha_mu && alpha_mu < alpha_2);
}

#[test]
fn posterior_calibration_factors_stay_positive() {
    let inference = Inference::new()
        .chains(2)
        .warmup(1_000)
        .draws(500)
        .seed(17);
    let fit = fit_calibration(&two_experiment_input(200), &inference).unwrap();
    let posterior = &fit.posterior;

    assert_eq!(
        posterior.names,
        ["alpha_mu[1]", "tau", "alpha_raw[1]", "alpha_raw[2]", "alpha[1]", "alpha[2]"]
    );

    let alpha_mu = posterior.draws("alpha_mu[1]").unwrap();
    assert!(alpha_mu.iter().all(|&a| a > 0.0 && a < 4096.0));
    for name in ["alpha[1]", "alpha[2]"] {
        let alpha = posterior.draws(name).unwrap();
        // non-negative deviations keep every experiment at or above its group mean
        for (a, mu) in alpha.iter().zip(&alpha_mu) {
            assert!(*a > 0.0 && a >= mu, "{}: {} below group mean {}", name, a, mu);
        }
    }

    let first = posterior.summary_of("alpha[1]").unwrap();
    let second = posterior.summary_of("alpha[2]").unwrap();
    assert!(
        first.median < second.median,
        "medians {} {}",
        first.median,
        second.median
    );
    assert!(posterior.summary_of("tau").unwrap().median > 0.0);
}

#[test]
fn single_lineage_mode_matches_fluctuation_estimate() {
    let (i_1, i_2) = sibling_pairs(80.0, 500);
    let model = SingleCalibration::new(i_1, i_2).unwrap();
    let moment = model.fluctuation_estimate().unwrap();
    assert!((moment - 80.0).abs() < 1e-6, "moment estimate {}", moment);

    let map = Inference::new().optimize(&model).unwrap();
    let alpha = map.get("alpha").unwrap();
    let se = map.std_error("alpha").unwrap();
    assert!((alpha - 80.0).abs() < 4.0, "alpha = {}", alpha);
    // roughly alpha * sqrt(2 / pairs)
    assert!(se > 2.0 && se < 10.0, "std error {}", se);
}
