use std::cmp::Ordering;
use std::error::Error;
use std::f64::consts::PI;
use std::fmt;

/// InputValueError is used if some game option or parameter does not fulfill the posed
/// requirements, e.g., route key times that are not strictly increasing.
#[derive(Debug, Clone)]
pub struct InputValueError {
    msg: String,
}

impl InputValueError {
    pub fn new(msg: impl Into<String>) -> InputValueError {
        InputValueError { msg: msg.into() }
    }
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value: {}", self.msg)
    }
}

impl Error for InputValueError {}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their original order.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => {
            indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            indices.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    }
    indices
}

/// wrap_angle reduces an angle (rad) to [0, 2 * pi[.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);

    // rem_euclid can round up to exactly 2 * pi for tiny negative inputs
    if wrapped >= 2.0 * PI {
        0.0
    } else {
        wrapped
    }
}

/// signed_angle_diff returns the shortest signed rotation (rad) from `from` to `to`, in
/// ]-pi, pi].
pub fn signed_angle_diff(from: f64, to: f64) -> f64 {
    let diff = wrap_angle(to - from);
    if diff > PI {
        diff - 2.0 * PI
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn argsort_descending_keeps_ties_in_order() {
        let idxs = argsort(&[1, 3, 3, 0], SortOrder::Descending);
        assert_eq!(idxs, vec![1, 2, 0, 3]);
    }

    #[test]
    fn wrap_angle_handles_negative_and_large_values() {
        assert_abs_diff_eq!(wrap_angle(-PI / 2.0), 1.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(5.0 * PI), PI, epsilon = 1e-12);
        assert!(wrap_angle(-1e-18) < 2.0 * PI);
    }

    #[test]
    fn signed_angle_diff_takes_shortest_arc() {
        let from = 250f64.to_radians();
        let to = 0.0;
        assert_abs_diff_eq!(signed_angle_diff(from, to), 110f64.to_radians(), epsilon = 1e-12);
        assert_abs_diff_eq!(signed_angle_diff(to, from), -110f64.to_radians(), epsilon = 1e-12);
    }
}
