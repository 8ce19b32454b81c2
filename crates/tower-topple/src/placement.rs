//! Placement Resolver: turns a surface hit into a tower anchor.

use glam::{Vec2, Vec3};
use topple_engine::Pose;

use crate::error::Rejection;

const DEGENERATE: f32 = 1e-5;
/// Outward nudges tried when rounding leaves a pushed anchor short.
const MAX_NUDGES: u32 = 32;

/// Validates anchors against a minimum distance from the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResolver {
    pub min_distance: f32,
}

impl PlacementResolver {
    pub fn new(min_distance: f32) -> Self {
        Self { min_distance }
    }

    /// Anchor for a placement gesture.
    ///
    /// Hits at least `min_distance` away (measured on the ground plane) come
    /// back unchanged. Closer hits are pushed outward along the ray from the
    /// player to `min_distance`, keeping the hit's height. A pushed anchor is
    /// never closer than `min_distance` after rounding, so resolving it again
    /// returns it unchanged. Only a missing hit is rejected.
    pub fn resolve(&self, hit: Option<&Pose>, viewer: &Pose) -> Result<Vec3, Rejection> {
        let hit = hit.ok_or(Rejection::PlacementRejected)?.position;
        let player = viewer.position;
        let offset = planar(hit - player);
        let distance = offset.length();
        if distance >= self.min_distance {
            return Ok(hit);
        }

        let direction = if distance > DEGENERATE {
            offset / distance
        } else {
            let facing = planar(viewer.forward());
            if facing.length() > DEGENERATE {
                facing.normalize()
            } else {
                Vec2::new(0.0, -1.0)
            }
        };
        Ok(self.push_out(player, direction, hit.y))
    }

    /// Point at `min_distance` from `player` along `direction`, nudged
    /// outward until the float result measures at least `min_distance`.
    fn push_out(&self, player: Vec3, direction: Vec2, height: f32) -> Vec3 {
        let origin = Vec2::new(player.x, player.z);
        let mut radius = self.min_distance;
        let mut nudge = self.min_distance * f32::EPSILON;
        let mut anchor = origin + direction * radius;
        for _ in 0..MAX_NUDGES {
            let candidate = Vec3::new(anchor.x, height, anchor.y);
            if planar_distance(candidate, player) >= self.min_distance {
                break;
            }
            radius += nudge;
            nudge *= 2.0;
            anchor = origin + direction * radius;
        }
        Vec3::new(anchor.x, height, anchor.y)
    }
}

/// Distance between two points on the ground (x/z) plane.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a - b).length()
}

fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use proptest::prelude::*;

    fn resolver() -> PlacementResolver {
        PlacementResolver::new(0.5)
    }

    fn at(x: f32, y: f32, z: f32) -> Pose {
        Pose::from_position(Vec3::new(x, y, z))
    }

    #[test]
    fn missing_hit_is_rejected() {
        let viewer = at(0.0, 1.6, 0.0);
        assert_eq!(resolver().resolve(None, &viewer), Err(Rejection::PlacementRejected));
    }

    #[test]
    fn far_hit_passes_through() {
        let viewer = at(0.0, 1.6, 0.0);
        let hit = at(0.3, -0.7, -1.2);
        assert_eq!(resolver().resolve(Some(&hit), &viewer), Ok(hit.position));
    }

    #[test]
    fn close_hit_is_pushed_to_the_minimum() {
        let viewer = at(0.0, 1.6, 0.0);
        let hit = at(0.0, -0.7, -0.2);
        let anchor = resolver().resolve(Some(&hit), &viewer).unwrap();
        assert!((anchor - Vec3::new(0.0, -0.7, -0.5)).length() < 1e-5);
        assert!(planar_distance(anchor, viewer.position) >= 0.5);
    }

    #[test]
    fn pushed_anchors_survive_rounding_off_the_origin() {
        let viewer = at(0.3, 1.6, -0.7);
        for step in 0..2000 {
            let angle = step as f32 * 0.0137;
            let reach = 0.05 + (step % 40) as f32 * 0.0098;
            let hit = at(
                0.3 + reach * angle.cos(),
                -0.6,
                -0.7 + reach * angle.sin(),
            );
            let once = resolver().resolve(Some(&hit), &viewer).unwrap();
            assert!(
                planar_distance(once, viewer.position) >= 0.5,
                "{:?} from {:?}",
                once,
                hit.position
            );
            let twice = resolver()
                .resolve(Some(&Pose::from_position(once)), &viewer)
                .unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn hit_straight_below_uses_viewer_heading() {
        // Facing +X.
        let viewer = Pose::new(
            Vec3::new(1.0, 1.6, 1.0),
            Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
        );
        let hit = at(1.0, 0.0, 1.0);
        let anchor = resolver().resolve(Some(&hit), &viewer).unwrap();
        assert!((anchor - Vec3::new(1.5, 0.0, 1.0)).length() < 1e-4, "{:?}", anchor);
    }

    #[test]
    fn looking_straight_down_falls_back_to_negative_z() {
        let viewer = Pose::new(
            Vec3::new(0.0, 1.6, 0.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        );
        let hit = at(0.0, 0.0, 0.0);
        let anchor = resolver().resolve(Some(&hit), &viewer).unwrap();
        assert!((anchor - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-4, "{:?}", anchor);
    }

    proptest! {
        #[test]
        fn anchor_is_never_too_close(
            px in -5.0f32..5.0, pz in -5.0f32..5.0,
            dx in -3.0f32..3.0, dz in -3.0f32..3.0,
            hy in -2.0f32..1.0,
        ) {
            let viewer = at(px, 1.6, pz);
            let hit = at(px + dx, hy, pz + dz);
            let anchor = resolver().resolve(Some(&hit), &viewer).unwrap();
            prop_assert!(planar_distance(anchor, viewer.position) >= 0.5);
            prop_assert_eq!(anchor.y, hy);
        }

        #[test]
        fn close_hits_stay_on_the_original_ray(
            dx in -0.49f32..0.49, dz in -0.49f32..0.49,
        ) {
            let d = (dx * dx + dz * dz).sqrt();
            prop_assume!(d > 0.01 && d < 0.5);
            let viewer = at(0.0, 1.6, 0.0);
            let hit = at(dx, 0.0, dz);
            let anchor = resolver().resolve(Some(&hit), &viewer).unwrap();
            let distance = planar_distance(anchor, viewer.position);
            prop_assert!(distance >= 0.5);
            prop_assert!(distance - 0.5 < 1e-5);
            // Same heading as the hit.
            let cross = anchor.x * dz - anchor.z * dx;
            prop_assert!(cross.abs() < 1e-4);
            prop_assert!(anchor.x * dx + anchor.z * dz > 0.0);
        }

        #[test]
        fn resolving_a_resolved_anchor_is_a_no_op(
            px in -5.0f32..5.0, pz in -5.0f32..5.0,
            dx in -2.0f32..2.0, dz in -2.0f32..2.0,
        ) {
            let viewer = at(px, 1.6, pz);
            let hit = at(px + dx, 0.0, pz + dz);
            let once = resolver().resolve(Some(&hit), &viewer).unwrap();
            let twice = resolver()
                .resolve(Some(&Pose::from_position(once)), &viewer)
                .unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
