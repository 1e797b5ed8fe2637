//! Pointer state and screen-to-world ray conversion for mouse picks

use std::sync::{PoisonError, RwLock};

use crate::foundation::math::{utils, Mat4, Point3, Vec3, Vec4};
use crate::physics::Ray;
use crate::picking::PointerQuery;

/// Pointer position over the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Screen-space X position (pixels from left)
    pub screen_x: f64,
    /// Screen-space Y position (pixels from top)
    pub screen_y: f64,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
}

impl PointerState {
    /// Pointer at the top-left corner of a window
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            window_width,
            window_height,
        }
    }

    /// Update pointer position from window events
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Update window size after a resize
    pub fn update_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Convert to normalized device coordinates
    ///
    /// X runs from -1 (left) to +1 (right), Y from -1 (bottom) to +1 (top).
    /// Returns `None` for a zero-sized window.
    pub fn screen_to_ndc(&self) -> Option<(f32, f32)> {
        if self.window_width == 0 || self.window_height == 0 {
            return None;
        }
        let ndc_x = (self.screen_x / f64::from(self.window_width)) as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / f64::from(self.window_height)) as f32 * 2.0;
        Some((ndc_x, ndc_y))
    }
}

/// Perspective camera the pointer looks through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clipping distance
    pub near: f32,
    /// Far clipping distance
    pub far: f32,
}

impl Viewport {
    /// Perspective viewport looking at the origin
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Aim the camera
    #[must_use]
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        self.target = target;
        self.up = up;
        self
    }

    /// Combined projection and view matrix
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        );
        let projection = Mat4::new_perspective(self.aspect, self.fov, self.near, self.far);
        projection * view
    }

    /// World-space ray through a point in normalized device coordinates
    ///
    /// `None` when the camera is degenerate (target on top of the position,
    /// zero aspect, and similar).
    pub fn ray_through_ndc(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;

        let unproject = |ndc_z: f32| {
            let h = inverse * Vec4::new(ndc_x, ndc_y, ndc_z, 1.0);
            (h.w.abs() > f32::EPSILON).then(|| Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w))
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;

        // Perspective rays start at the eye, not on the near plane
        Ray::try_new(self.position, far - near)
            .filter(|ray| utils::is_finite(&ray.direction))
    }
}

/// Shared pointer and viewport, answering [`PointerQuery`]
#[derive(Debug)]
pub struct PointerTracker {
    state: RwLock<PointerState>,
    viewport: RwLock<Option<Viewport>>,
}

impl PointerTracker {
    /// Tracker for a window with no active viewport yet
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            state: RwLock::new(PointerState::new(window_width, window_height)),
            viewport: RwLock::new(None),
        }
    }

    /// Move the pointer
    pub fn update_position(&self, x: f64, y: f64) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update_position(x, y);
    }

    /// Resize the window
    pub fn update_window_size(&self, width: u32, height: u32) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update_window_size(width, height);
    }

    /// Set or clear the active viewport
    pub fn set_viewport(&self, viewport: Option<Viewport>) {
        *self.viewport.write().unwrap_or_else(PoisonError::into_inner) = viewport;
    }

    /// Current pointer state
    pub fn state(&self) -> PointerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PointerQuery for PointerTracker {
    fn current_pointer_ray(&self) -> Option<Ray> {
        let viewport = (*self.viewport.read().unwrap_or_else(PoisonError::into_inner))?;
        let (ndc_x, ndc_y) = self.state().screen_to_ndc()?;
        viewport.ray_through_ndc(ndc_x, ndc_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_to_ndc() {
        let mut pointer = PointerState::new(800, 600);
        pointer.update_position(400.0, 300.0);
        let (x, y) = pointer.screen_to_ndc().unwrap();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);

        pointer.update_position(0.0, 0.0);
        assert_eq!(pointer.screen_to_ndc(), Some((-1.0, 1.0)));

        pointer.update_window_size(0, 600);
        assert!(pointer.screen_to_ndc().is_none());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let viewport = Viewport::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, 4.0 / 3.0, 0.1, 100.0);
        let ray = viewport.ray_through_ndc(0.0, 0.0).unwrap();

        assert_relative_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
    }

    #[test]
    fn test_top_of_screen_tilts_up() {
        let viewport = Viewport::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, 1.0, 0.1, 100.0);
        let ray = viewport.ray_through_ndc(0.0, 0.9).unwrap();
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn test_tracker_needs_viewport() {
        let tracker = PointerTracker::new(800, 600);
        tracker.update_position(400.0, 300.0);
        assert!(tracker.current_pointer_ray().is_none());

        tracker.set_viewport(Some(Viewport::perspective(
            Vec3::new(0.0, 10.0, 0.0),
            60.0,
            4.0 / 3.0,
            0.1,
            100.0,
        )
        .looking_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0))));

        let ray = tracker.current_pointer_ray().unwrap();
        assert_relative_eq!(ray.direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_viewport_has_no_ray() {
        let viewport = Viewport::perspective(Vec3::zeros(), 60.0, 1.0, 0.1, 100.0);
        assert!(viewport.ray_through_ndc(0.0, 0.0).is_none());
    }
}
