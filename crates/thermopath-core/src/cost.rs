//! Local error model between a pair of observations.

/// Local cost between an observation of the first series and one of the second.
///
/// Implemented by [`ErrorModel`] and by every `Fn(f64, f64) -> f64`, so a plain
/// function or closure can be passed wherever a cost is expected. The first
/// argument comes from series A, the second from series B. Costs are expected to
/// be non-negative.
pub trait LocalCost {
    /// Cost of aligning `a` with `b`.
    fn cost(&self, a: f64, b: f64) -> f64;
}

impl<F> LocalCost for F
where
    F: Fn(f64, f64) -> f64,
{
    #[inline]
    fn cost(&self, a: f64, b: f64) -> f64 {
        self(a, b)
    }
}

/// Squared-error model with optional square root and sign ambiguity.
///
/// # Defaults
///
/// | Parameter    | Default |
/// |--------------|---------|
/// | `sqrt`       | false   |
/// | `both_signs` | true    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorModel {
    sqrt: bool,
    both_signs: bool,
}

impl Default for ErrorModel {
    fn default() -> Self {
        Self {
            sqrt: false,
            both_signs: true,
        }
    }
}

impl ErrorModel {
    /// Take the square root of the squared difference, giving an absolute error.
    #[must_use]
    pub fn with_sqrt(mut self, sqrt: bool) -> Self {
        self.sqrt = sqrt;
        self
    }

    /// Also score the anti-correlated reading `(a + b)^2` and keep the smaller cost.
    ///
    /// Disabling this commits the model to positive correlation only.
    #[must_use]
    pub fn with_both_signs(mut self, both_signs: bool) -> Self {
        self.both_signs = both_signs;
        self
    }

    /// Return whether the square root is applied.
    #[must_use]
    pub fn sqrt(&self) -> bool {
        self.sqrt
    }

    /// Return whether both correlation signs are considered.
    #[must_use]
    pub fn both_signs(&self) -> bool {
        self.both_signs
    }

    /// Error between `a` and `b` under this model.
    #[must_use]
    pub fn error(&self, a: f64, b: f64) -> f64 {
        let correlated = self.signed_error(a, b, -1.0);
        if self.both_signs {
            correlated.min(self.signed_error(a, b, 1.0))
        } else {
            correlated
        }
    }

    #[inline]
    fn signed_error(&self, a: f64, b: f64, sign: f64) -> f64 {
        let e = (a + sign * b).powi(2);
        if self.sqrt { e.sqrt() } else { e }
    }
}

impl LocalCost for ErrorModel {
    #[inline]
    fn cost(&self, a: f64, b: f64) -> f64 {
        self.error(a, b)
    }
}

/// Error between `a` and `b` under the default [`ErrorModel`].
///
/// Squared difference, taking the better of the correlated and anti-correlated
/// readings.
#[must_use]
pub fn error(a: f64, b: f64) -> f64 {
    ErrorModel::default().error(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_takes_min_of_both_signs() {
        // (2-3)^2 = 1, (2+3)^2 = 25
        assert_eq!(error(2.0, 3.0), 1.0);
        // (1-(-1))^2 = 4, (1+(-1))^2 = 0
        assert_eq!(error(1.0, -1.0), 0.0);
    }

    #[test]
    fn single_sign_ignores_anti_correlation() {
        let model = ErrorModel::default().with_both_signs(false);
        assert_eq!(model.error(1.0, -1.0), 4.0);
        assert_eq!(model.error(2.0, 3.0), 1.0);
    }

    #[test]
    fn sqrt_gives_absolute_difference() {
        let model = ErrorModel::default().with_sqrt(true).with_both_signs(false);
        assert!((model.error(1.0, 4.0) - 3.0).abs() < 1e-12);
        assert!((model.error(4.0, 1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sqrt_with_both_signs() {
        let model = ErrorModel::default().with_sqrt(true);
        // |(-2) - 3| = 5, |(-2) + 3| = 1
        assert!((model.error(-2.0, 3.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn error_is_symmetric_and_non_negative() {
        let values = [-3.5, -1.0, 0.0, 0.25, 2.0, 7.5];
        for &a in &values {
            for &b in &values {
                let e = error(a, b);
                assert!(e >= 0.0);
                assert_eq!(e, error(b, a), "asymmetry at ({a}, {b})");
            }
        }
    }

    #[test]
    fn identical_values_cost_nothing() {
        assert_eq!(error(3.25, 3.25), 0.0);
        assert_eq!(ErrorModel::default().with_sqrt(true).error(-1.5, -1.5), 0.0);
    }

    #[test]
    fn closures_and_functions_are_costs() {
        let abs = |a: f64, b: f64| (a - b).abs();
        assert_eq!(abs.cost(1.0, 3.0), 2.0);
        assert_eq!(error.cost(2.0, 3.0), 1.0);
        assert_eq!(ErrorModel::default().cost(2.0, 3.0), 1.0);
    }

    #[test]
    fn accessors_reflect_builder() {
        let model = ErrorModel::default();
        assert!(!model.sqrt());
        assert!(model.both_signs());
        let model = model.with_sqrt(true).with_both_signs(false);
        assert!(model.sqrt());
        assert!(!model.both_signs());
    }
}
