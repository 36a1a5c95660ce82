//! Series preprocessing: z-normalization.

use crate::error::PreprocessError;

/// Z-normalize a series to zero mean and unit variance.
///
/// Uses population standard deviation (divides by n, not n-1). The error model
/// compares raw magnitudes, so two series recorded in different units should
/// be normalized before computing their partition function.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PreprocessError::EmptySeries`] | `series` is empty |
/// | [`PreprocessError::ConstantSeries`] | All values are identical (zero variance) |
#[must_use = "returns a new normalized series; the original is unchanged"]
pub fn z_normalize(series: &[f64]) -> Result<Vec<f64>, PreprocessError> {
    let Some(&first) = series.first() else {
        return Err(PreprocessError::EmptySeries);
    };

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std == 0.0 {
        return Err(PreprocessError::ConstantSeries {
            n: series.len(),
            value: first,
        });
    }

    Ok(series.iter().map(|&x| (x - mean) / std).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mean_unit_variance() {
        let z = z_normalize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let variance = z.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12);
        assert!((variance - 1.0).abs() < 1e-12);
        // mean 5, population std 2
        assert!((z[0] + 1.5).abs() < 1e-12);
        assert!((z[7] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(z_normalize(&[]), Err(PreprocessError::EmptySeries));
    }

    #[test]
    fn rejects_constant() {
        assert_eq!(
            z_normalize(&[3.0, 3.0, 3.0]),
            Err(PreprocessError::ConstantSeries { n: 3, value: 3.0 })
        );
    }

    #[test]
    fn scale_and_offset_invariant() {
        let a = [1.0, 3.0, 2.0, 6.0];
        let b: Vec<f64> = a.iter().map(|x| 10.0 * x - 4.0).collect();
        let za = z_normalize(&a).unwrap();
        let zb = z_normalize(&b).unwrap();
        for (x, y) in za.iter().zip(&zb) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
