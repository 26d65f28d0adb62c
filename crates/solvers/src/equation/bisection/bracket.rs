use thiserror::Error;

/// Why a pair of points cannot bound a root search.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BracketError {
    #[error("bracket endpoints must be finite")]
    NonFinite,

    #[error("bracket endpoints coincide")]
    ZeroWidth,

    #[error("residuals at both endpoints have the same sign")]
    NoSignChange,
}

/// Sign of a residual. Zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// Checks a requested search interval and returns it in ascending order.
pub(super) fn ordered(interval: [f64; 2]) -> Result<[f64; 2], BracketError> {
    let [a, b] = interval;
    if !(a.is_finite() && b.is_finite()) {
        return Err(BracketError::NonFinite);
    }
    let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
    if upper - lower <= 0.0 {
        return Err(BracketError::ZeroWidth);
    }
    Ok([lower, upper])
}

/// An interval known to contain a sign change of the residual.
///
/// Only the sign at the lower end is kept; the upper end always has the
/// other one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    lower: f64,
    upper: f64,
    lower_sign: Sign,
}

impl Bracket {
    /// Builds a bracket from two evaluated points, in either order.
    pub(super) fn new(a: (f64, Sign), b: (f64, Sign)) -> Result<Self, BracketError> {
        let ((lower, lower_sign), (upper, upper_sign)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        ordered([lower, upper])?;
        if lower_sign == upper_sign {
            return Err(BracketError::NoSignChange);
        }
        Ok(Self {
            lower,
            upper,
            lower_sign,
        })
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    pub(super) fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// The bracket is narrower than `x_abs_tol + x_rel_tol * |midpoint|`.
    pub(super) fn is_x_converged(&self, x_abs_tol: f64, x_rel_tol: f64) -> bool {
        self.width() <= x_abs_tol + x_rel_tol * self.midpoint().abs()
    }

    /// Moves whichever end shares the sign of the point at `x` onto it.
    pub(super) fn shrink(&mut self, x: f64, sign: Sign) {
        if sign == self.lower_sign {
            self.lower = x;
        } else {
            self.upper = x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn requested_intervals_are_put_in_ascending_order() {
        assert_eq!(ordered([5.0, 1e-4]), Ok([1e-4, 5.0]));
        assert_eq!(ordered([0.0, 1e-4]), Ok([0.0, 1e-4]));
        assert_eq!(ordered([f64::NAN, 1.0]), Err(BracketError::NonFinite));
        assert_eq!(ordered([0.3, f64::INFINITY]), Err(BracketError::NonFinite));
        assert_eq!(ordered([0.45, 0.45]), Err(BracketError::ZeroWidth));
    }

    #[test]
    fn both_ends_must_disagree_in_sign() {
        let err = Bracket::new((0.01, Sign::Negative), (2.0, Sign::Negative));
        assert_eq!(err, Err(BracketError::NoSignChange));
    }

    #[test]
    fn points_given_high_to_low_keep_their_signs() {
        // Flow residual: an empty channel falls short, a deep one overflows.
        let mut depth = Bracket::new((2.0, Sign::Positive), (0.0, Sign::Negative)).unwrap();
        assert_eq!(depth.lower(), 0.0);
        assert_eq!(depth.upper(), 2.0);

        depth.shrink(1.0, Sign::Positive);
        assert_eq!((depth.lower(), depth.upper()), (0.0, 1.0));
    }

    #[test]
    fn shrinking_a_depth_bracket_never_leaves_it() {
        let mut depth = Bracket::new((0.0, Sign::Negative), (1e-4, Sign::Positive)).unwrap();
        let root = 2.6e-5;

        while !depth.is_x_converged(1e-9, 0.0) {
            let mid = depth.midpoint();
            depth.shrink(mid, Sign::of(mid - root));
            assert!(depth.lower() >= 0.0 && depth.upper() <= 1e-4);
            assert!(depth.lower() <= root && root <= depth.upper());
        }

        assert_relative_eq!(depth.midpoint(), root, epsilon = 1e-9);
    }
}
