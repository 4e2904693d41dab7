/// Snap `yaw` to the nearest multiple of `snap_angle` when it is strictly
/// within `tolerance` of it, otherwise return it unchanged. All radians.
pub fn snap_yaw(yaw: f32, snap_angle: f32, tolerance: f32) -> f32 {
    if snap_angle <= 0.0 {
        return yaw;
    }
    let nearest = (yaw / snap_angle).round() * snap_angle;
    if (yaw - nearest).abs() < tolerance {
        nearest
    } else {
        yaw
    }
}

/// Yaw (radians, about +Y) that turns an object's +Z face toward an observer
/// looking along `forward`. Falls back to `fallback` when `forward` is vertical.
pub fn yaw_facing(forward: glam::Vec3, fallback: f32) -> f32 {
    let toward = glam::Vec3::new(-forward.x, 0.0, -forward.z);
    if toward.length_squared() < 1e-8 {
        return fallback;
    }
    toward.x.atan2(toward.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const SNAP: f32 = std::f32::consts::FRAC_PI_4;

    fn deg(d: f32) -> f32 {
        d.to_radians()
    }

    #[test]
    fn near_multiple_snaps() {
        let snapped = snap_yaw(deg(40.0), SNAP, deg(10.0));
        assert!((snapped - deg(45.0)).abs() < 1e-6);
    }

    #[test]
    fn far_from_multiple_is_kept() {
        let snapped = snap_yaw(deg(20.0), SNAP, deg(10.0));
        assert!((snapped - deg(20.0)).abs() < 1e-6);
    }

    #[test]
    fn exact_multiple_is_unchanged() {
        for k in -8..=8 {
            let yaw = k as f32 * SNAP;
            assert_eq!(snap_yaw(yaw, SNAP, deg(10.0)), yaw);
            assert_eq!(snap_yaw(snap_yaw(yaw, SNAP, deg(10.0)), SNAP, deg(10.0)), yaw);
        }
    }

    #[test]
    fn negative_yaw_snaps_symmetrically() {
        let snapped = snap_yaw(deg(-93.0), SNAP, deg(10.0));
        assert!((snapped - deg(-90.0)).abs() < 1e-6);
    }

    #[test]
    fn facing_turns_toward_observer() {
        // Observer looks down -Z, so the object must face +Z: yaw 0.
        assert!(yaw_facing(Vec3::NEG_Z, 1.0).abs() < 1e-6);
        // Observer looks down +X, object faces -X.
        let yaw = yaw_facing(Vec3::X, 0.0);
        assert!((yaw.abs() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(yaw < 0.0);
        // Looking straight down keeps the fallback.
        assert_eq!(yaw_facing(Vec3::NEG_Y, 0.3), 0.3);
    }
}
