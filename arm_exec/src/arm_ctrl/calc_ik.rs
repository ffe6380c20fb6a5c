//! Closed form inverse kinematics for the arm.
//!
//! The solver works in the arm base frame (Y up, Z forward) and degrees
//! throughout, since the demands it produces are servo positions. The base
//! servo only spans half a turn, so targets behind the base are reached by
//! folding the arm over the top: the base stays within its range while the
//! shoulder and wrist mirror their solutions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::{ArmCtrl, OutputData, Reachability, NEUTRAL_WRIST_TILT_DEG};
use comms_if::eqpt::arm::TargetPose;
use util::maths::{clamp, wrap_to_360};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Floor applied to the shoulder-to-wrist planar distance, keeps the
/// shoulder solution finite for targets at the shoulder joint itself.
///
/// Units: meters
const MIN_PLANAR_DIST_M: f64 = 1e-4;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmCtrl {
    /// Solve the inverse kinematics for the given target, producing demands
    /// for all five joints.
    ///
    /// This function cannot fail: out of reach targets are clamped to the
    /// edge of the envelope and joints that exceed their safe range are
    /// limited, with both conditions raised in the status report.
    pub(crate) fn calc_ik(&mut self, target: &TargetPose) -> OutputData {
        let geom = self.geom;
        let prev = self.output.unwrap_or_default();

        // ---- GRIPPER COMPENSATION ----

        // The target is the grasp point, the solver places the wrist, so
        // back off along the approach direction by the gripper length. The
        // approach is horizontal where possible, falling back to the full
        // 3D direction (and finally straight forward) for targets above the
        // base.
        let pos = target.pos_m;
        let horiz = Vector3::new(pos.x, 0.0, pos.z);

        let approach = if horiz.norm() > f64::EPSILON {
            horiz / horiz.norm()
        } else if pos.norm() > f64::EPSILON {
            pos / pos.norm()
        } else {
            Vector3::z()
        };

        let mut wrist = pos - approach * geom.gripper_m;

        // A near vertical approach gives horizontal hold no meaningful level
        // to hold, so it is suppressed.
        let steep = horiz.norm() < self.params.horizontal_hold_min_ratio * pos.norm();

        // ---- REACH CLAMP ----

        // If the wrist is further from the shoulder joint than the arm can
        // extend, pull it back onto the envelope boundary.
        let shoulder_pos = Vector3::new(0.0, geom.base_hgt_m, 0.0);
        let mut v = wrist - shoulder_pos;
        let max_reach_m = geom.max_reach_m() - self.params.reach_margin_m;

        if v.norm() > max_reach_m {
            v *= max_reach_m / v.norm();
            wrist = shoulder_pos + v;
            self.report.reachability = Reachability::AtLimit;
        }

        // ---- BASE ----

        let base_raw_deg = wrap_to_360(wrist.x.atan2(wrist.z).to_degrees() + 90.0);

        // Raw bearings beyond the servo's half turn are reached backwards,
        // with the shoulder and wrist folded over the top.
        let backwards = base_raw_deg > 180.0;
        self.report.backwards = backwards;

        let base_deg = if backwards {
            base_raw_deg - 180.0
        } else {
            base_raw_deg
        };

        // ---- SHOULDER AND ELBOW ----

        // Two link triangle in the vertical plane through the base bearing.
        let hdist_m = (wrist.x * wrist.x + wrist.z * wrist.z).sqrt();
        let dy_m = wrist.y - geom.base_hgt_m;
        let s_m2 = hdist_m * hdist_m + dy_m * dy_m;
        let s_m = s_m2.sqrt().max(MIN_PLANAR_DIST_M);

        // Cosine inputs are clamped to [-1, 1], rounding error at full
        // extension would otherwise produce NaN.
        let cos_elbow = clamp(
            &((geom.upper_sq_m2 + geom.forearm_sq_m2 - s_m2)
                / (2.0 * geom.upper_m * geom.forearm_m)),
            &-1.0,
            &1.0,
        );
        let elbow_deg = self.params.elbow_offset_deg - cos_elbow.acos().to_degrees();

        let cos_shoulder = clamp(
            &((geom.upper_sq_m2 + s_m2 - geom.forearm_sq_m2) / (2.0 * geom.upper_m * s_m)),
            &-1.0,
            &1.0,
        );
        let shoulder_fwd_deg = self.params.shoulder_offset_deg
            - (dy_m.atan2(hdist_m) + cos_shoulder.acos()).to_degrees();

        // The fold mirrors the shoulder about vertical, the elbow is
        // unaffected as it is interior to the triangle.
        let shoulder_deg = if backwards {
            180.0 - shoulder_fwd_deg
        } else {
            shoulder_fwd_deg
        };

        // ---- WRIST ----

        let horizontal_hold = self.params.keep_horizontal && !steep;
        self.report.horizontal_hold = horizontal_hold;

        let wrist_tilt_deg = if horizontal_hold {
            // Counter-rotate against the shoulder and elbow so the end
            // effector stays level.
            let tilt_deg = 90.0 + (shoulder_fwd_deg - 90.0) + (elbow_deg - 90.0);

            if backwards {
                180.0 - tilt_deg
            } else {
                tilt_deg
            }
        } else {
            NEUTRAL_WRIST_TILT_DEG
        };

        let wrist_rot_deg = target.yaw_deg;

        // ---- JOINT LIMITS ----

        OutputData {
            base_deg: limit_joint(
                base_deg,
                &self.params.base_range_deg,
                prev.base_deg,
                &mut self.report.base_limited,
            ),
            shoulder_deg: limit_joint(
                shoulder_deg,
                &self.params.shoulder_range_deg,
                prev.shoulder_deg,
                &mut self.report.shoulder_limited,
            ),
            elbow_deg: limit_joint(
                elbow_deg,
                &self.params.elbow_range_deg,
                prev.elbow_deg,
                &mut self.report.elbow_limited,
            ),
            wrist_tilt_deg: limit_joint(
                wrist_tilt_deg,
                &self.params.wrist_tilt_range_deg,
                prev.wrist_tilt_deg,
                &mut self.report.wrist_tilt_limited,
            ),
            wrist_rot_deg: limit_joint(
                wrist_rot_deg,
                &self.params.wrist_rot_range_deg,
                prev.wrist_rot_deg,
                &mut self.report.wrist_rot_limited,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a joint demand into its safe range, raising the limit flag if the
/// demand was modified.
///
/// A NaN demand is replaced with the previous demand for the joint, so a
/// degenerate solution holds position rather than commanding garbage.
fn limit_joint(value_deg: f64, range_deg: &[f64; 2], prev_deg: f64, limited: &mut bool) -> f64 {
    if value_deg.is_nan() {
        return prev_deg;
    }

    let clamped_deg = clamp(&value_deg, &range_deg[0], &range_deg[1]);

    if clamped_deg != value_deg {
        *limited = true;
    }

    clamped_deg
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::{ArmGeometry, Params};
    use super::*;

    /// Build an ArmCtrl with the standard test geometry and the given
    /// gripper length.
    fn test_arm(gripper_m: f64, keep_horizontal: bool) -> ArmCtrl {
        let mut ctrl = ArmCtrl::default();

        ctrl.params = Params {
            use_ref_points: false,
            ref_points_m: [[0.0; 3]; 4],
            base_hgt_m: 0.10,
            upper_m: 0.35,
            forearm_m: 0.35,
            gripper_m,
            shoulder_offset_deg: 180.0,
            elbow_offset_deg: 270.0,
            reach_margin_m: 0.001,
            keep_horizontal,
            horizontal_hold_min_ratio: 0.2,
            base_range_deg: [0.0, 180.0],
            shoulder_range_deg: [15.0, 165.0],
            elbow_range_deg: [0.0, 180.0],
            wrist_tilt_range_deg: [0.0, 180.0],
            wrist_rot_range_deg: [0.0, 180.0],
        };

        // Calibration preserves a zero gripper offset, so the pure triangle
        // tests can target the wrist directly.
        ctrl.geom = ArmGeometry::from_lengths(0.10, 0.35, 0.35, gripper_m);

        ctrl
    }

    fn target(x: f64, y: f64, z: f64) -> TargetPose {
        TargetPose {
            pos_m: Vector3::new(x, y, z),
            yaw_deg: 90.0,
        }
    }

    fn assert_in_ranges(ctrl: &ArmCtrl, out: &OutputData) {
        let p = &ctrl.params;
        assert!(out.base_deg >= p.base_range_deg[0] && out.base_deg <= p.base_range_deg[1]);
        assert!(
            out.shoulder_deg >= p.shoulder_range_deg[0]
                && out.shoulder_deg <= p.shoulder_range_deg[1]
        );
        assert!(out.elbow_deg >= p.elbow_range_deg[0] && out.elbow_deg <= p.elbow_range_deg[1]);
        assert!(
            out.wrist_tilt_deg >= p.wrist_tilt_range_deg[0]
                && out.wrist_tilt_deg <= p.wrist_tilt_range_deg[1]
        );
        assert!(
            out.wrist_rot_deg >= p.wrist_rot_range_deg[0]
                && out.wrist_rot_deg <= p.wrist_rot_range_deg[1]
        );
    }

    #[test]
    fn test_straight_ahead() {
        let mut ctrl = test_arm(0.0, true);

        let out = ctrl.calc_ik(&target(0.0, 0.10, 0.50));

        assert_eq!(ctrl.report.reachability, Reachability::Reachable);
        assert!(!ctrl.report.backwards);

        // Target dead ahead puts the base at its centre
        assert!((out.base_deg - 90.0).abs() < 1e-9);

        // Hand checked triangle solution for the 0.35/0.35 arm at 0.5 m
        assert!((out.shoulder_deg - 135.58).abs() < 0.01);
        assert!((out.elbow_deg - 178.83).abs() < 0.01);

        assert!((out.wrist_rot_deg - 90.0).abs() < 1e-9);
        assert_in_ranges(&ctrl, &out);
    }

    #[test]
    fn test_out_of_reach_clamped() {
        let mut ctrl = test_arm(0.0, true);

        // 0.8 m ahead is beyond the 0.7 m reach of the arm
        let out = ctrl.calc_ik(&target(0.0, 0.10, 0.80));

        assert_eq!(ctrl.report.reachability, Reachability::AtLimit);

        // The demand must still be a valid pose at the edge of the envelope
        assert!(out.base_deg.is_finite());
        assert!(out.shoulder_deg.is_finite());
        assert!(out.elbow_deg.is_finite());
        assert!(out.wrist_tilt_deg.is_finite());
        assert_in_ranges(&ctrl, &out);

        // At full extension the shoulder demand exceeds its safe range and
        // is limited
        assert!(ctrl.report.shoulder_limited);
        assert!((out.shoulder_deg - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_reach_behind_fold() {
        let mut ctrl = test_arm(0.0, false);

        // Two targets straddling the edge of the base servo's half turn,
        // 2 degrees of bearing apart, at a radius both configurations can
        // reach without hitting joint limits.
        let r = 0.52;
        let ahead = target(
            r * 89f64.to_radians().sin(),
            0.10,
            r * 89f64.to_radians().cos(),
        );
        let behind = target(
            r * 91f64.to_radians().sin(),
            0.10,
            r * 91f64.to_radians().cos(),
        );

        let out_ahead = ctrl.calc_ik(&ahead);
        assert!(!ctrl.report.backwards);

        let out_behind = ctrl.calc_ik(&behind);
        assert!(ctrl.report.backwards);

        // The fold maps the base back into range...
        assert!((out_ahead.base_deg - 179.0).abs() < 1e-9);
        assert!((out_behind.base_deg - 1.0).abs() < 1e-9);

        // ...mirrors the shoulder about vertical...
        assert!((out_behind.shoulder_deg - (180.0 - out_ahead.shoulder_deg)).abs() < 1e-9);

        // ...and leaves the elbow untouched
        assert!((out_behind.elbow_deg - out_ahead.elbow_deg).abs() < 1e-9);

        // The effective bearing (base + half turn when folded) stays
        // continuous across the boundary
        let bearing_ahead = out_ahead.base_deg;
        let bearing_behind = out_behind.base_deg + 180.0;
        assert!((bearing_behind - bearing_ahead - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_target_suppresses_hold() {
        let mut ctrl = test_arm(0.098, true);

        let out = ctrl.calc_ik(&target(0.0, 0.60, 0.0));

        // No horizontal component, so the gripper compensation falls back to
        // the 3D direction and the hold is suppressed
        assert!(!ctrl.report.horizontal_hold);
        assert!((out.wrist_tilt_deg - NEUTRAL_WRIST_TILT_DEG).abs() < 1e-9);

        assert!(out.base_deg.is_finite());
        assert!(out.shoulder_deg.is_finite());
        assert!(out.elbow_deg.is_finite());
    }

    #[test]
    fn test_gripper_compensation() {
        // Solving for a grasp point one gripper length further out must give
        // the same joints as solving for the wrist point directly.
        let mut with_gripper = test_arm(0.098, true);
        let mut without = test_arm(0.0, true);

        let out_a = with_gripper.calc_ik(&target(0.0, 0.20, 0.50 + 0.098));
        let out_b = without.calc_ik(&target(0.0, 0.20, 0.50));

        assert!((out_a.base_deg - out_b.base_deg).abs() < 1e-9);
        assert!((out_a.shoulder_deg - out_b.shoulder_deg).abs() < 1e-9);
        assert!((out_a.elbow_deg - out_b.elbow_deg).abs() < 1e-9);
        assert!((out_a.wrist_tilt_deg - out_b.wrist_tilt_deg).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let mut ctrl = test_arm(0.098, true);
        let t = target(0.15, 0.25, 0.40);

        let out_1 = ctrl.calc_ik(&t);
        ctrl.output = Some(out_1);
        let out_2 = ctrl.calc_ik(&t);

        assert_eq!(out_1, out_2);
    }

    #[test]
    fn test_envelope_sweep() {
        let mut ctrl = test_arm(0.098, true);

        // Sweep bearings all the way round, including behind the base, at a
        // spread of radii and heights. Every output must be finite and
        // within the safe ranges, including well out of reach targets.
        for bearing_deg in (0..360).step_by(30) {
            for &radius_m in &[0.2, 0.4, 0.6, 0.9] {
                for &height_m in &[0.0, 0.2, 0.5] {
                    let b = (bearing_deg as f64).to_radians();
                    let t = target(radius_m * b.sin(), height_m, radius_m * b.cos());

                    let out = ctrl.calc_ik(&t);

                    assert!(
                        out.base_deg.is_finite()
                            && out.shoulder_deg.is_finite()
                            && out.elbow_deg.is_finite()
                            && out.wrist_tilt_deg.is_finite()
                            && out.wrist_rot_deg.is_finite(),
                        "non-finite output for bearing {} radius {} height {}",
                        bearing_deg,
                        radius_m,
                        height_m
                    );
                    assert_in_ranges(&ctrl, &out);
                }
            }
        }
    }

    #[test]
    fn test_target_at_shoulder_joint() {
        let mut ctrl = test_arm(0.0, true);

        // Degenerate target on the shoulder joint itself, the planar
        // distance floor keeps everything finite
        let out = ctrl.calc_ik(&target(0.0, 0.10, 0.0));

        assert!(out.base_deg.is_finite());
        assert!(out.shoulder_deg.is_finite());
        assert!(out.elbow_deg.is_finite());
        assert_in_ranges(&ctrl, &out);
    }

    #[test]
    fn test_limit_joint_nan_holds_previous() {
        let mut limited = false;

        let out = limit_joint(f64::NAN, &[0.0, 180.0], 42.0, &mut limited);

        assert_eq!(out, 42.0);
        assert!(!limited);
    }
}
