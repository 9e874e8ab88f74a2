//! Screen/world transform for the floor plan.
//!
//! `screen = pan + padding + world * pixels_per_meter * zoom`, with world
//! `z` drawn along screen `y`.

use shelfplan_math::{Point2, Vec2};

use crate::EditorConfig;

/// Pan/zoom state of the plan view.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    zoom: f64,
    pan: Vec2,
    padding: f64,
    pixels_per_meter: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Camera {
    /// Camera at zoom 1 with no pan.
    ///
    /// Swapped zoom bounds are put back in order; non-finite or
    /// non-positive ones pin zoom at 1. [`EditorConfig::validate`] rejects
    /// both, so this only matters for unvalidated configs.
    pub fn new(config: &EditorConfig) -> Self {
        let (min_zoom, max_zoom) = zoom_bounds(config.min_zoom, config.max_zoom);
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Vec2::zeros(),
            padding: config.padding_px,
            pixels_per_meter: config.pixels_per_meter,
            min_zoom,
            max_zoom,
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current pan offset in pixels.
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Screen pixels per world metre at the current zoom.
    pub fn scale(&self) -> f64 {
        self.pixels_per_meter * self.zoom
    }

    /// Map a world point to the screen.
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        let offset = self.pan + Vec2::new(self.padding, self.padding);
        Point2::from(world.coords * self.scale() + offset)
    }

    /// Map a screen point to the world.
    pub fn screen_to_world(&self, screen: Point2) -> Point2 {
        let offset = self.pan + Vec2::new(self.padding, self.padding);
        Point2::from((screen.coords - offset) / self.scale())
    }

    /// Shift the view by `delta` pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Multiply zoom by `factor` (clamped), keeping the world point under
    /// `screen` fixed on screen.
    pub fn zoom_at(&mut self, screen: Point2, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let anchor = self.screen_to_world(screen);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let padding = Vec2::new(self.padding, self.padding);
        self.pan = screen.coords - padding - anchor.coords * self.scale();
    }
}

fn zoom_bounds(a: f64, b: f64) -> (f64, f64) {
    let usable = |z: f64| z.is_finite() && z > 0.0;
    if usable(a) && usable(b) {
        (a.min(b), a.max(b))
    } else {
        (1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        let mut camera = Camera::new(&EditorConfig::default());
        camera.pan_by(Vec2::new(13.0, -7.0));
        camera.zoom_at(Point2::new(100.0, 100.0), 1.7);
        let world = Point2::new(3.25, 8.5);
        let back = camera.screen_to_world(camera.world_to_screen(world));
        assert_relative_eq!(back.x, world.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-9);
    }

    #[test]
    fn test_origin_offset_by_padding() {
        let camera = Camera::new(&EditorConfig::default());
        let screen = camera.world_to_screen(Point2::new(0.0, 0.0));
        assert_eq!(screen, Point2::new(40.0, 40.0));
        let screen = camera.world_to_screen(Point2::new(1.0, 2.0));
        assert_eq!(screen, Point2::new(60.0, 80.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new(&EditorConfig::default());
        let screen = Point2::new(250.0, 180.0);
        let before = camera.screen_to_world(screen);
        camera.zoom_at(screen, 2.5);
        let after = camera.screen_to_world(screen);
        assert_relative_eq!(camera.zoom(), 2.5);
        assert_relative_eq!(before.x, after.x, epsilon = 1e-9);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new(&EditorConfig::default());
        camera.zoom_at(Point2::new(0.0, 0.0), 100.0);
        assert_relative_eq!(camera.zoom(), 5.0);
        camera.zoom_at(Point2::new(0.0, 0.0), 1e-6);
        assert_relative_eq!(camera.zoom(), 0.1);
        camera.zoom_at(Point2::new(0.0, 0.0), -2.0);
        assert_relative_eq!(camera.zoom(), 0.1);
    }

    #[test]
    fn test_inverted_zoom_bounds_do_not_panic() {
        let config = EditorConfig {
            min_zoom: 4.0,
            max_zoom: 0.5,
            ..EditorConfig::default()
        };
        let mut camera = Camera::new(&config);
        assert_relative_eq!(camera.zoom(), 1.0);
        camera.zoom_at(Point2::new(0.0, 0.0), 100.0);
        assert_relative_eq!(camera.zoom(), 4.0);
        camera.zoom_at(Point2::new(0.0, 0.0), 1e-6);
        assert_relative_eq!(camera.zoom(), 0.5);

        let broken = EditorConfig {
            min_zoom: f64::NAN,
            ..EditorConfig::default()
        };
        let mut camera = Camera::new(&broken);
        camera.zoom_at(Point2::new(0.0, 0.0), 3.0);
        assert_relative_eq!(camera.zoom(), 1.0);
    }
}
