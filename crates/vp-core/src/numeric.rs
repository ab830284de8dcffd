use crate::VpError;

/// Floating point type for chart coordinates and spectrum values.
pub type Real = f64;

/// Strict absolute closeness: `|a - b| < eps`.
///
/// Used for point picking, where a hit must fall strictly inside the window.
pub fn within(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, VpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(VpError::NonFinite { what, value: v })
    }
}

/// Parse a user-entered number (table cell, clipboard field).
pub fn parse_real(text: &str, what: &'static str) -> Result<Real, VpError> {
    let v: Real = text
        .trim()
        .parse()
        .map_err(|_| VpError::InvalidArg { what })?;
    ensure_finite(v, what)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        assert!(matches!(err, VpError::NonFinite { what: "test", value } if value.is_nan()));
        assert!(err.to_string().contains("Non-finite"));
    }

    #[test]
    fn within_is_strict() {
        assert!(within(1.0, 1.0 + 5e-6, 1e-5));
        assert!(!within(0.0, 1e-5, 1e-5));
        assert!(!within(0.0, 1.0, 1e-5));
    }

    #[test]
    fn parse_real_trims_and_rejects_garbage() {
        assert_eq!(parse_real(" 2.5\r", "cell").unwrap(), 2.5);
        assert_eq!(parse_real("abc", "cell"), Err(VpError::InvalidArg { what: "cell" }));
        assert!(parse_real("inf", "cell").is_err());
    }
}
