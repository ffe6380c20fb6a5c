//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- CALIBRATION ----

    /// If true link lengths are derived from the reference points in
    /// `ref_points_m` rather than taken from the explicit lengths below.
    pub use_ref_points: bool,

    /// Calibration reference points, in order: base, shoulder, elbow, wrist.
    ///
    /// Units: meters,
    /// Frame: Arm base
    pub ref_points_m: [[f64; 3]; 4],

    /// Height of the shoulder joint above the base.
    ///
    /// Units: meters
    pub base_hgt_m: f64,

    /// Length of the upper arm link (shoulder to elbow).
    ///
    /// Units: meters
    pub upper_m: f64,

    /// Length of the forearm link (elbow to wrist).
    ///
    /// Units: meters
    pub forearm_m: f64,

    /// Length of the gripper, from the wrist to the grasp point.
    ///
    /// Units: meters
    pub gripper_m: f64,

    // ---- SOLVER ----

    /// Servo offset applied to the shoulder triangle solution.
    ///
    /// Units: degrees
    pub shoulder_offset_deg: f64,

    /// Servo offset applied to the elbow triangle solution.
    ///
    /// Units: degrees
    pub elbow_offset_deg: f64,

    /// Margin held back from the full extension of the arm when clamping
    /// out of reach targets.
    ///
    /// Units: meters
    pub reach_margin_m: f64,

    /// If true the wrist tilt servo counter-rotates against the shoulder and
    /// elbow to keep the end effector level.
    pub keep_horizontal: bool,

    /// Minimum ratio of horizontal to total target distance below which the
    /// approach is considered vertical and horizontal hold is suppressed.
    pub horizontal_hold_min_ratio: f64,

    // ---- CAPABILITIES ----

    /// Safe range of the base servo, [min, max].
    ///
    /// Units: degrees
    pub base_range_deg: [f64; 2],

    /// Safe range of the shoulder servo, [min, max].
    ///
    /// Units: degrees
    pub shoulder_range_deg: [f64; 2],

    /// Safe range of the elbow servo, [min, max].
    ///
    /// Units: degrees
    pub elbow_range_deg: [f64; 2],

    /// Safe range of the wrist tilt servo, [min, max].
    ///
    /// Units: degrees
    pub wrist_tilt_range_deg: [f64; 2],

    /// Safe range of the wrist rotation servo, [min, max].
    ///
    /// Units: degrees
    pub wrist_rot_range_deg: [f64; 2],
}
