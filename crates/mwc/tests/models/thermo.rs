//! Van't Hoff model fitted to two temperatures.

use mwc::{fit_thermo, Inference, ThermoInput, ThermoModel, ThermoParams};
use mwc_core::thermo::energy;

/// 25 °C and 37 °C, one unrepressed and one repressed strain at each.
fn two_temperature_input() -> ThermoInput {
    ThermoInput {
        j: 2,
        n: 4,
        temps: vec![25.0, 37.0],
        idx: vec![1, 1, 2, 2],
        n_ns: 4.6e6,
        repressors: vec![0.0, 260.0, 0.0, 260.0],
        foldchange: vec![1.0, 0.3, 1.0, 0.25],
    }
}

fn inference() -> Inference {
    Inference::new()
        .chains(2)
        .warmup(1_000)
        .draws(1_000)
        .seed(2024)
}

#[test]
fn mode_predicts_repression_only_where_repressors_are_present() {
    let input = two_temperature_input();
    let fit = fit_thermo(&input, &inference()).unwrap();
    let map = &fit.map;

    let del_h = map.get("del_h").unwrap();
    let del_s = map.get("del_s").unwrap();
    let sigma = map.get("sigma").unwrap();
    assert!(del_h > 0.0 && del_h.is_finite(), "del_h = {}", del_h);
    assert!(del_s > 0.0 && del_s.is_finite(), "del_s = {}", del_s);
    assert!(sigma > 0.0 && sigma < 1.0, "sigma = {}", sigma);

    let model = ThermoModel::from_input(&input).unwrap();
    let params = ThermoParams::from_slice(&map.values).unwrap();
    let fc = model.predicted_fold_change(&params);

    // unrepressed strains are exactly at full expression
    assert_eq!(fc[0], 1.0);
    assert_eq!(fc[2], 1.0);
    // repressed strains sit near the observed ~0.25-0.3
    for &i in &[1, 3] {
        assert!(fc[i] > 0.1 && fc[i] < 0.6, "fc[{}] = {}", i, fc[i]);
    }

    // energies follow the Van't Hoff line through the fitted del_h and del_s
    let e1 = map.get("energy[1]").unwrap();
    let e2 = map.get("energy[2]").unwrap();
    let (t1, t2) = (25.0 + 273.15, 37.0 + 273.15);
    assert!((e1 - energy(del_h, del_s, t1)).abs() < 1e-9);
    assert!((e2 - energy(del_h, del_s, t2)).abs() < 1e-9);
    assert!((e2 - e1 - del_h * (1.0 / t1 - 1.0 / t2)).abs() < 1e-9);

    // a positive del_h weakens binding as the temperature rises
    assert!(e1 < e2, "energies {} {} with del_h = {}", e1, e2, del_h);
    assert!(fc[1] < fc[3], "fc {} at 25 C, {} at 37 C", fc[1], fc[3]);
}

#[test]
fn posterior_summaries_cover_parameters_and_energies() {
    let fit = fit_thermo(&two_temperature_input(), &inference()).unwrap();
    let posterior = &fit.posterior;

    assert_eq!(
        posterior.names,
        ["sigma", "epsilon", "del_h", "del_s", "energy[1]", "energy[2]"]
    );
    assert_eq!(posterior.summary.len(), 6);
    for s in &posterior.summary {
        assert!(s.hpd_min <= s.median && s.median <= s.hpd_max, "{:?}", s);
        assert!(s.mean.is_finite(), "{:?}", s);
        assert!(s.ess > 0.0, "{:?}", s);
    }
    assert!(posterior.draws("del_h").unwrap().iter().all(|&h| h > 0.0));
    assert!(posterior.draws("sigma").unwrap().iter().all(|&s| s > 0.0));

    // epsilon is informed by its Normal(-12, 6) prior only
    let epsilon = posterior.summary_of("epsilon").unwrap();
    assert!((epsilon.mean + 12.0).abs() < 3.0, "epsilon mean {}", epsilon.mean);

    // binding energies are pinned by the repressed strains
    for name in ["energy[1]", "energy[2]"] {
        let e = posterior.summary_of(name).unwrap();
        assert!(e.median < -8.0 && e.median > -14.0, "{} median {}", name, e.median);
    }
}

#[test]
fn fits_are_reproducible_for_a_seed() {
    let a = fit_thermo(&two_temperature_input(), &inference()).unwrap();
    let b = fit_thermo(&two_temperature_input(), &inference().parallel(false)).unwrap();
    assert_eq!(a.map, b.map);
    assert_eq!(a.posterior.chains, b.posterior.chains);
}
