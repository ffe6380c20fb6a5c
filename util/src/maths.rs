//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    // Sum all elements of the points
    let mut sum = T::from(0).unwrap();

    for i in 0..point_0.len() {
        sum += (point_0[i] - point_1[i]).powi(2);
    }

    // Return the squareroot of the sum
    Some(sum.sqrt())
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_to_360<T>(angle_deg: T) -> T
where
    T: Float
{
    let full_turn = T::from(360.0).unwrap();

    let mut wrapped = angle_deg % full_turn;

    if wrapped < T::from(0.0).unwrap() {
        wrapped = wrapped + full_turn;
    }

    wrapped
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5f64);
        assert_eq!(clamp(&-0.5f64, &0f64, &1f64), 0f64);
        assert_eq!(clamp(&1.5f64, &0f64, &1f64), 1f64);
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[0f64, 0f64], &[3f64, 4f64]), Some(5f64));
        assert_eq!(norm(&[0f64], &[1f64, 2f64]), None);
    }

    #[test]
    fn test_wrap_to_360() {
        assert_eq!(wrap_to_360(0f64), 0f64);
        assert_eq!(wrap_to_360(270f64), 270f64);
        assert_eq!(wrap_to_360(360f64), 0f64);
        assert_eq!(wrap_to_360(-90f64), 270f64);
        assert_eq!(wrap_to_360(540f64), 180f64);
    }
}
