use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use crate::api::types::Pose;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersection with the horizontal plane `y = height`, if in front of the origin.
    pub fn hit_horizontal_plane(&self, height: f32) -> Option<Vec3> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t > 0.0).then(|| self.at(t))
    }
}

/// Perspective viewer (the player's eye / device camera).
/// Screen points are in viewport units, origin top-left, Y down.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub pose: Pose,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport size in screen points.
    pub viewport: Vec2,
    pub near: f32,
    pub far: f32,
}

impl Viewer {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            pose: Pose::IDENTITY,
            fov_y: 60f32.to_radians(),
            viewport: Vec2::new(viewport_width, viewport_height),
            near: 0.01,
            far: 100.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn forward(&self) -> Vec3 {
        self.pose.forward()
    }

    /// Move the viewer to `position`, facing `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.pose.position = position;
        let back = (position - target).normalize_or_zero();
        if back == Vec3::ZERO {
            return;
        }
        let mut right = Vec3::Y.cross(back);
        if right.length_squared() < 1e-8 {
            // Looking straight up or down: keep the current heading.
            right = self.pose.right();
        }
        let right = right.normalize();
        let up = back.cross(right);
        self.pose.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.pose.rotation, self.pose.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    /// World-space ray through a screen point.
    pub fn screen_ray(&self, screen: Vec2) -> Ray {
        let ndc_x = 2.0 * screen.x / self.viewport.x.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.viewport.y.max(1.0);
        let tan = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc_x * tan * self.aspect(), ndc_y * tan, -1.0).normalize();
        Ray {
            origin: self.pose.position,
            direction: self.pose.rotation * local,
        }
    }

    /// Screen point of a world position, or `None` if it is behind the viewer.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Check if a world-space point falls inside the viewport.
    pub fn is_visible(&self, point: Vec3) -> bool {
        self.project(point).is_some_and(|p| {
            p.x >= 0.0 && p.x <= self.viewport.x && p.y >= 0.0 && p.y <= self.viewport.y
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn center_ray_follows_forward() {
        let viewer = Viewer::new(400.0, 800.0);
        let ray = viewer.screen_ray(Vec2::new(200.0, 400.0));
        assert!(close(ray.direction, Vec3::NEG_Z), "dir {:?}", ray.direction);
    }

    #[test]
    fn upper_half_of_screen_points_up() {
        let viewer = Viewer::new(400.0, 800.0);
        let ray = viewer.screen_ray(Vec2::new(200.0, 100.0));
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn plane_hit_in_front_only() {
        let mut viewer = Viewer::new(400.0, 800.0);
        viewer.look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let ray = viewer.screen_ray(Vec2::new(200.0, 400.0));
        let hit = ray.hit_horizontal_plane(0.0).unwrap();
        assert!(close(hit, Vec3::new(0.0, 0.0, -1.0)), "hit {:?}", hit);

        // A plane above the eye is behind the downward ray.
        assert!(ray.hit_horizontal_plane(2.0).is_none());
    }

    #[test]
    fn look_at_sets_forward() {
        let mut viewer = Viewer::new(100.0, 100.0);
        viewer.look_at(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        assert!(close(viewer.forward(), Vec3::X));
    }

    #[test]
    fn project_inverts_screen_ray() {
        let mut viewer = Viewer::new(640.0, 480.0);
        viewer.look_at(Vec3::new(0.2, 1.4, 0.5), Vec3::new(0.0, 0.0, -1.0));
        let screen = Vec2::new(100.0, 300.0);
        let point = viewer.screen_ray(screen).at(2.0);
        let back = viewer.project(point).unwrap();
        assert!((back - screen).length() < 0.05, "projected to {:?}", back);
        assert!(viewer.is_visible(point));
    }
}
