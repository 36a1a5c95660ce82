//! Property tests for the partition function and the average path.

use proptest::prelude::*;
use thermopath_core::{
    Boundary, ThermalError, ThermalPath, average_path, iter_lattice, partition_function,
    partition_function_with,
};

fn series(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0f64..5.0, 1..max_len)
}

fn paired(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..max_len).prop_flat_map(|n| {
        (
            prop::collection::vec(-5.0f64..5.0, n),
            prop::collection::vec(-5.0f64..5.0, n),
        )
    })
}

proptest! {
    #[test]
    fn identical_series_are_symmetric(a in series(40), temperature in 0.2f64..5.0) {
        let g = partition_function(&a, &a, temperature).unwrap();
        prop_assert_eq!(g.transpose(), g);
    }

    #[test]
    fn identical_series_have_no_lag(a in series(30), temperature in 0.5f64..5.0) {
        let g = partition_function(&a, &a, temperature).unwrap();
        let avg = average_path(&g);
        prop_assert_eq!(avg.len(), 2 * a.len() - 1);
        for &v in avg.values() {
            prop_assert!(v.is_finite());
            prop_assert!(v.abs() < 1e-9);
        }
    }

    #[test]
    fn weights_are_finite_and_non_negative((a, b) in paired(40), temperature in 0.2f64..5.0) {
        let g = partition_function(&a, &b, temperature).unwrap();
        for &v in g.as_slice() {
            prop_assert!(v.is_finite());
            prop_assert!(v >= 0.0);
        }
    }

    #[test]
    fn swapping_series_transposes((a, b) in paired(30), temperature in 0.2f64..5.0) {
        let ab = partition_function(&a, &b, temperature).unwrap();
        let ba = partition_function(&b, &a, temperature).unwrap();
        prop_assert_eq!(ab.transpose(), ba);
    }

    #[test]
    fn average_lag_stays_within_lattice((a, b) in paired(30), temperature in 0.5f64..5.0) {
        let n = a.len();
        let avg = ThermalPath::new(temperature).average_path(&a, &b).unwrap();
        for &v in avg.values() {
            if v.is_finite() {
                prop_assert!(v.abs() <= (n - 1) as f64 + 1e-9);
            }
        }
    }

    #[test]
    fn rescaling_preserves_average_path(
        (a, b) in (1usize..20).prop_flat_map(|n| (
            prop::collection::vec(-2.0f64..2.0, n),
            prop::collection::vec(-2.0f64..2.0, n),
        )),
        temperature in 1.0f64..5.0,
    ) {
        let engine = ThermalPath::new(temperature);
        let raw = average_path(&engine.partition_function(&a, &b).unwrap());
        let scaled = average_path(engine.partition_function_scaled(&a, &b).unwrap().table());
        prop_assert_eq!(raw.len(), scaled.len());
        for (&x, &y) in raw.values().iter().zip(scaled.values()) {
            prop_assert!((x - y).abs() <= 1e-9 * x.abs().max(1.0), "{} vs {}", x, y);
        }
    }

    #[test]
    fn parallel_matches_serial((a, b) in paired(60), temperature in 0.2f64..5.0) {
        let engine = ThermalPath::new(temperature);
        let serial = engine.partition_function(&a, &b).unwrap();
        let parallel = engine.partition_function_par(&a, &b).unwrap();
        prop_assert_eq!(serial, parallel);
    }

    #[test]
    fn custom_cost_closure_is_used(a in series(20)) {
        let b: Vec<f64> = a.iter().map(|x| x + 100.0).collect();
        // A cost that ignores the values reproduces the free-cost table.
        let free = partition_function_with(&a, &b, 1.0, |_: f64, _: f64| 0.0).unwrap();
        let zeros = vec![0.0; a.len()];
        let reference = partition_function_with(&zeros, &zeros, 1.0, |_: f64, _: f64| 0.0).unwrap();
        prop_assert_eq!(free, reference);
    }

    #[test]
    fn mismatched_lengths_fail(a in series(20), extra in 1usize..5) {
        let b = vec![0.0; a.len() + extra];
        prop_assert_eq!(
            partition_function(&a, &b, 1.0),
            Err(ThermalError::LengthMismatch { len_a: a.len(), len_b: b.len() })
        );
    }

    #[test]
    fn lattice_count_matches(n in 0usize..60) {
        prop_assert_eq!(iter_lattice(n, Boundary::Included).count(), n * n);
        prop_assert_eq!(iter_lattice(n, Boundary::Excluded).count(), n.saturating_sub(1).pow(2));
    }
}
