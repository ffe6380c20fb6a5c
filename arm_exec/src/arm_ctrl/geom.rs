//! Calibrated arm geometry
//!
//! The solver works on link lengths. These can either be given directly in
//! the parameter file, or derived from a set of measured reference points
//! (base, shoulder, elbow, wrist) taken while the arm is in a known pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum length a link may take before calibration is considered
/// degenerate.
///
/// Units: meters
pub const MIN_LINK_LENGTH_M: f64 = 0.001;

/// Length substituted for a degenerate link.
///
/// Units: meters
pub const DEFAULT_LINK_LENGTH_M: f64 = 0.125;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The calibrated geometry of the arm.
///
/// The two link lengths are guaranteed to be at least [`MIN_LINK_LENGTH_M`],
/// so the solver never divides by a zero link length. The base height and
/// gripper offset are taken as configured, zero is a valid value for both.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArmGeometry {
    /// Height of the shoulder joint above the base.
    ///
    /// Units: meters
    pub base_hgt_m: f64,

    /// Length of the upper arm link.
    ///
    /// Units: meters
    pub upper_m: f64,

    /// Length of the forearm link.
    ///
    /// Units: meters
    pub forearm_m: f64,

    /// Length of the gripper.
    ///
    /// Units: meters
    pub gripper_m: f64,

    /// Square of the upper arm length, precomputed for the solver.
    ///
    /// Units: meters^2
    pub upper_sq_m2: f64,

    /// Square of the forearm length, precomputed for the solver.
    ///
    /// Units: meters^2
    pub forearm_sq_m2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmGeometry {
    /// Build the geometry from the module parameters.
    pub fn from_params(params: &Params) -> Self {
        if params.use_ref_points {
            Self::from_ref_points(&params.ref_points_m, params.gripper_m)
        } else {
            Self::from_lengths(
                params.base_hgt_m,
                params.upper_m,
                params.forearm_m,
                params.gripper_m,
            )
        }
    }

    /// Build the geometry from explicit link lengths.
    pub fn from_lengths(base_hgt_m: f64, upper_m: f64, forearm_m: f64, gripper_m: f64) -> Self {
        let base_hgt_m = finite_or_zero(base_hgt_m);
        let upper_m = floor_link(upper_m);
        let forearm_m = floor_link(forearm_m);
        let gripper_m = finite_or_zero(gripper_m);

        Self {
            base_hgt_m,
            upper_m,
            forearm_m,
            gripper_m,
            upper_sq_m2: upper_m * upper_m,
            forearm_sq_m2: forearm_m * forearm_m,
        }
    }

    /// Build the geometry from measured reference points.
    ///
    /// The points are, in order: base, shoulder, elbow, wrist. Link lengths
    /// are the distances between consecutive points.
    pub fn from_ref_points(ref_points_m: &[[f64; 3]; 4], gripper_m: f64) -> Self {
        let points: Vec<Vector3<f64>> = ref_points_m
            .iter()
            .map(|p| Vector3::new(p[0], p[1], p[2]))
            .collect();

        Self::from_lengths(
            (points[1] - points[0]).norm(),
            (points[2] - points[1]).norm(),
            (points[3] - points[2]).norm(),
            gripper_m,
        )
    }

    /// The furthest the wrist can be from the shoulder joint.
    ///
    /// Units: meters
    pub fn max_reach_m(&self) -> f64 {
        self.upper_m + self.forearm_m
    }
}

/// Substitute the default length for a degenerate link.
fn floor_link(length_m: f64) -> f64 {
    if !length_m.is_finite() || length_m < MIN_LINK_LENGTH_M {
        DEFAULT_LINK_LENGTH_M
    } else {
        length_m
    }
}

/// Replace a non-finite offset with zero.
///
/// Unlike the link lengths, the base height and gripper offset may
/// legitimately be zero and are not floored.
fn finite_or_zero(length_m: f64) -> f64 {
    if length_m.is_finite() {
        length_m
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_lengths() {
        let geom = ArmGeometry::from_lengths(0.10, 0.35, 0.35, 0.098);

        assert_eq!(geom.base_hgt_m, 0.10);
        assert_eq!(geom.upper_m, 0.35);
        assert_eq!(geom.forearm_m, 0.35);
        assert_eq!(geom.gripper_m, 0.098);
        assert!((geom.upper_sq_m2 - 0.1225).abs() < 1e-12);
        assert!((geom.max_reach_m() - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_links_get_defaults() {
        // Zero, negative and non-finite link lengths must all fall back to
        // the default rather than poisoning the solver.
        let geom = ArmGeometry::from_lengths(0.10, -0.2, f64::NAN, 0.098);

        assert_eq!(geom.upper_m, DEFAULT_LINK_LENGTH_M);
        assert_eq!(geom.forearm_m, DEFAULT_LINK_LENGTH_M);

        let geom = ArmGeometry::from_lengths(0.10, 0.0005, 0.0, 0.098);

        assert_eq!(geom.upper_m, DEFAULT_LINK_LENGTH_M);
        assert_eq!(geom.forearm_m, DEFAULT_LINK_LENGTH_M);
    }

    #[test]
    fn test_zero_offsets_preserved() {
        // Zero base height and zero gripper offset (no compensation) are
        // valid configurations, only the link lengths carry the floor.
        let geom = ArmGeometry::from_lengths(0.0, 0.35, 0.35, 0.0);

        assert_eq!(geom.base_hgt_m, 0.0);
        assert_eq!(geom.gripper_m, 0.0);
        assert_eq!(geom.upper_m, 0.35);
        assert_eq!(geom.forearm_m, 0.35);
    }

    #[test]
    fn test_non_finite_offsets_zeroed() {
        let geom = ArmGeometry::from_lengths(f64::NAN, 0.35, 0.35, f64::INFINITY);

        assert_eq!(geom.base_hgt_m, 0.0);
        assert_eq!(geom.gripper_m, 0.0);
    }

    #[test]
    fn test_from_ref_points() {
        let refs = [
            [0.0, 0.0, 0.0],
            [0.0, 0.10, 0.0],
            [0.0, 0.45, 0.0],
            [0.0, 0.45, 0.35],
        ];

        let geom = ArmGeometry::from_ref_points(&refs, 0.098);

        assert!((geom.base_hgt_m - 0.10).abs() < 1e-12);
        assert!((geom.upper_m - 0.35).abs() < 1e-12);
        assert!((geom.forearm_m - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_ref_points_get_defaults() {
        let refs = [[0.1, 0.1, 0.1]; 4];

        let geom = ArmGeometry::from_ref_points(&refs, 0.098);

        // Coincident references give zero link lengths, which are floored.
        // A zero base height is a legal geometry and stays as measured.
        assert_eq!(geom.base_hgt_m, 0.0);
        assert_eq!(geom.upper_m, DEFAULT_LINK_LENGTH_M);
        assert_eq!(geom.forearm_m, DEFAULT_LINK_LENGTH_M);
    }
}
