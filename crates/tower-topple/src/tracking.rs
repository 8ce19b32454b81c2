//! Headless surface tracker: a perspective viewer over one horizontal plane.

use glam::{Vec2, Vec3};
use topple_engine::{Pose, Viewer};

use crate::ports::SurfaceTracker;

/// Tracks a single detected horizontal surface, such as a table top or the
/// floor. Until a surface is detected every hit test misses.
#[derive(Debug, Clone)]
pub struct PlaneTracker {
    pub viewer: Viewer,
    surface_height: Option<f32>,
}

impl PlaneTracker {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            surface_height: None,
        }
    }

    pub fn with_surface(mut self, height: f32) -> Self {
        self.surface_height = Some(height);
        self
    }

    pub fn detect_surface(&mut self, height: f32) {
        log::info!("surface detected at y={:.2}", height);
        self.surface_height = Some(height);
    }

    pub fn lose_surface(&mut self) {
        self.surface_height = None;
    }

    pub fn surface_height(&self) -> Option<f32> {
        self.surface_height
    }

    /// Move the viewpoint, keeping the detected surface.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.viewer.look_at(position, target);
    }
}

impl SurfaceTracker for PlaneTracker {
    fn hit_test(&self, screen: Vec2) -> Option<Pose> {
        let height = self.surface_height?;
        let point = self.viewer.screen_ray(screen).hit_horizontal_plane(height)?;
        Some(Pose::from_position(point))
    }

    fn viewer(&self) -> Pose {
        self.viewer.pose
    }
}
