use crate::CapError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Relative difference of `computed` against `reference`.
///
/// Falls back to the absolute difference when the reference is zero.
pub fn relative_error(computed: Real, reference: Real) -> Real {
    let diff = (computed - reference).abs();
    if reference == 0.0 {
        diff
    } else {
        diff / reference.abs()
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CapError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CapError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CapError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CapError::InvalidArg { what })
    }
}

/// Format `value` the way C's `%W.Pe` does: signed two-digit exponent,
/// right-aligned in `width` columns.
///
/// Rust's `{:e}` prints `1.5e0`; plotting tools that read the sweep tables
/// expect `1.5000000e+00`.
pub fn format_scientific(value: Real, width: usize, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{:>width$}", value, width = width);
    }
    let raw = format!("{:.*e}", precision, value);
    let formatted = match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    };
    format!("{:>width$}", formatted, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "capacitance").is_err());
        assert!(ensure_positive(-1.0, "capacitance").is_err());
        assert_eq!(ensure_positive(2.5, "capacitance").unwrap(), 2.5);
    }

    #[test]
    fn relative_error_handles_zero_reference() {
        assert_eq!(relative_error(0.5, 0.0), 0.5);
        assert!((relative_error(1.01, 1.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn scientific_matches_c_layout() {
        assert_eq!(format_scientific(1.5, 10, 7), "1.5000000e+00");
        assert_eq!(format_scientific(0.00123, 10, 7), "1.2300000e-03");
        assert_eq!(format_scientific(-2.0e12, 10, 3), "-2.000e+12");
        assert_eq!(format_scientific(1.0e100, 10, 1), "  1.0e+100");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn scientific_parses_back(mantissa in 1.0_f64..10.0, exponent in -30_i32..30) {
            let value = mantissa * 10f64.powi(exponent);
            let text = format_scientific(value, 10, 7);
            let parsed: f64 = text.trim().parse().unwrap();
            let tol = Tolerances { abs: 0.0, rel: 1e-7 };
            prop_assert!(nearly_equal(parsed, value, tol));
        }
    }
}
