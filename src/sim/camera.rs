//! Camera: the window into world space the renderer draws
//!
//! Two modes, picked by the sling phase:
//! - follow: ease the view centre toward the flying turkey, horizontally only
//! - idle: scroll-wheel zoom around the view centre and edge panning driven
//!   by how far the pointer sits from the canvas centre
//!
//! Pan and zoom keep the bounds inside the level extents on every axis the
//! bounds fit. The pointer mapping is refreshed after every bounds change.

use glam::Vec2;

use super::state::Viewport;
use crate::lerp;
use crate::tuning::Tuning;

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.min += delta;
        self.max += delta;
    }

    /// Is `self` entirely inside `outer` (edges may touch)?
    pub fn within(&self, outer: &Bounds) -> bool {
        self.min.x >= outer.min.x && self.min.y >= outer.min.y && self.max.x <= outer.max.x && self.max.y <= outer.max.y
    }
}

/// Screen → world transform for pointer events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapping {
    pub offset: Vec2,
    pub scale: Vec2,
}

impl PointerMapping {
    #[inline]
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        self.offset + screen * self.scale
    }
}

/// New start of `min..min+size` moved by `t`, kept inside `lo..hi` when it
/// fits; an axis wider than the extents does not move.
fn clamp_axis(min: f32, size: f32, t: f32, lo: f32, hi: f32) -> f32 {
    if size > hi - lo {
        return min;
    }
    (min + t).clamp(lo, hi - size)
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub bounds: Bounds,
    /// Canvas size: the bounds size at zoom 1
    base: Vec2,
    /// Min corner of the starting view
    home: Vec2,
    extents: Bounds,
    scale: f32,
    scale_target: f32,
    mapping: PointerMapping,
}

impl Camera {
    pub fn new(canvas: Viewport, extents: Bounds) -> Self {
        let base = canvas.size();
        let bounds = Bounds::new(Vec2::ZERO, base);
        Self {
            bounds,
            base,
            home: bounds.min,
            extents,
            scale: 1.0,
            scale_target: 1.0,
            mapping: PointerMapping {
                offset: bounds.min,
                scale: Vec2::ONE,
            },
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scale_target(&self) -> f32 {
        self.scale_target
    }

    pub fn extents(&self) -> Bounds {
        self.extents
    }

    pub fn mapping(&self) -> PointerMapping {
        self.mapping
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.mapping.to_world(screen)
    }

    fn refresh_mapping(&mut self) {
        self.mapping = PointerMapping {
            offset: self.bounds.min,
            scale: self.bounds.size() / self.base,
        };
    }

    /// Ease the view centre toward `target_x`, keeping the vertical centre
    pub fn follow(&mut self, target_x: f32, smoothing: f32) {
        let current = self.bounds.center().x;
        let next = lerp(current, target_x, smoothing);
        self.bounds.translate(Vec2::new(next - current, 0.0));
        self.refresh_mapping();
    }

    /// Move the zoom target by wheel notches (positive = scroll down = zoom out)
    pub fn zoom_by(&mut self, notches: i32, tuning: &Tuning) {
        if notches == 0 {
            return;
        }
        let target = (self.scale_target + notches as f32 * tuning.zoom_step).clamp(tuning.zoom_min, tuning.zoom_max);
        if target != self.scale_target {
            log::debug!("Zoom target {:.2} -> {:.2}", self.scale_target, target);
            self.scale_target = target;
        }
    }

    /// One tick of easing toward the zoom target, resizing around the view centre
    pub fn ease_zoom(&mut self, tuning: &Tuning) {
        if (self.scale - self.scale_target).abs() <= tuning.zoom_epsilon {
            return;
        }
        let step = (self.scale_target - self.scale) * tuning.zoom_ease;
        self.scale += step;

        self.bounds.max = self.bounds.min + self.base * self.scale;
        self.bounds.translate(self.base * step * -0.5);
        self.pull_inside();
        self.refresh_mapping();
    }

    /// Edge pan from a pointer position in canvas pixels
    pub fn pan(&mut self, pointer: Vec2, tuning: &Tuning) {
        let from_center = pointer - self.base / 2.0;
        let dist = from_center.length();
        if dist <= tuning.pan_dead_zone {
            return;
        }
        let speed = ((dist - tuning.pan_dead_zone).powi(2) * tuning.pan_gain).min(tuning.pan_max_speed);
        let min = self.clamped_min(from_center / dist * speed);
        if min != self.bounds.min {
            self.place(min);
            self.refresh_mapping();
        }
    }

    /// Idle-mode tick: wheel zoom, easing and pan
    pub fn idle(&mut self, pointer: Option<Vec2>, wheel_notches: i32, tuning: &Tuning) {
        self.zoom_by(wheel_notches, tuning);
        self.ease_zoom(tuning);
        if let Some(pointer) = pointer {
            self.pan(pointer, tuning);
        }
    }

    /// Back to the starting view, keeping the current zoom
    pub fn reset_view(&mut self) {
        self.place(self.home);
        self.refresh_mapping();
    }

    /// Canvas changed size: keep the min corner, re-size at the current zoom
    pub fn resize(&mut self, canvas: Viewport) {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return;
        }
        self.base = canvas.size();
        self.bounds.max = self.bounds.min + self.base * self.scale;
        self.refresh_mapping();
    }

    /// Min corner after moving by `t`, clamped to the extents
    fn clamped_min(&self, t: Vec2) -> Vec2 {
        let size = self.bounds.size();
        let (lo, hi) = (self.extents.min, self.extents.max);
        Vec2::new(
            clamp_axis(self.bounds.min.x, size.x, t.x, lo.x, hi.x),
            clamp_axis(self.bounds.min.y, size.y, t.y, lo.y, hi.y),
        )
    }

    /// Move the bounds so they start at `min`, same size
    fn place(&mut self, min: Vec2) {
        let size = self.bounds.size();
        self.bounds = Bounds::new(min, min + size);
    }

    fn pull_inside(&mut self) {
        let min = self.clamped_min(Vec2::ZERO);
        self.place(min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> Camera {
        Camera::new(
            Viewport::new(1000.0, 796.0),
            Bounds::new(Vec2::ZERO, Vec2::new(5000.0, 800.0)),
        )
    }

    #[test]
    fn test_follow_moves_toward_target() {
        let mut cam = camera();
        cam.follow(1500.0, 0.2);
        // centre 500 -> 500 + 0.2 * 1000
        assert!((cam.bounds.center().x - 700.0).abs() < 1e-3);
        assert_eq!(cam.bounds.min.y, 0.0);
        assert_eq!(cam.mapping().offset, cam.bounds.min);
    }

    #[test]
    fn test_pan_dead_zone() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(1000.0, 0.0));
        let before = cam.bounds;
        cam.pan(Vec2::new(540.0, 398.0), &tuning);
        assert_eq!(cam.bounds, before);
    }

    #[test]
    fn test_pan_speed_caps() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(1000.0, 0.0));
        // Far right of centre: (450 - 50)^2 * 0.0002 = 32 → capped at 10
        cam.pan(Vec2::new(950.0, 398.0), &tuning);
        assert!((cam.bounds.min.x - 1010.0).abs() < 1e-3);
    }

    #[test]
    fn test_pan_clamps_at_left_edge() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(3.0, 0.0));
        cam.pan(Vec2::new(0.0, 398.0), &tuning);
        assert_eq!(cam.bounds.min.x, 0.0);
        assert_eq!(cam.mapping().offset.x, 0.0);
    }

    #[test]
    fn test_zoom_eases_and_rescales_mapping() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(2000.0, 0.0));
        cam.zoom_by(-3, &tuning);
        assert!((cam.scale_target() - 0.7).abs() < 1e-5);

        for _ in 0..100 {
            cam.ease_zoom(&tuning);
        }
        assert!((cam.scale() - 0.7).abs() <= tuning.zoom_epsilon + 1e-4);
        assert!((cam.bounds.size().x - 1000.0 * cam.scale()).abs() < 1e-2);
        assert!((cam.mapping().scale.x - cam.scale()).abs() < 1e-4);
        // Zoomed around the centre
        assert!((cam.bounds.center().x - 2500.0).abs() < 1e-2);
    }

    #[test]
    fn test_screen_to_world_after_zoom_and_pan() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(1000.0, 0.0));
        cam.zoom_by(-5, &tuning);
        for _ in 0..200 {
            cam.ease_zoom(&tuning);
        }
        let world = cam.screen_to_world(Vec2::new(100.0, 100.0));
        let expected = cam.bounds.min + Vec2::new(100.0, 100.0) * cam.scale();
        assert!((world - expected).length() < 1e-2);
    }

    #[test]
    fn test_reset_view_returns_home() {
        let tuning = Tuning::default();
        let mut cam = camera();
        cam.follow(4000.0, 0.5);
        cam.pan(Vec2::new(500.0, 796.0), &tuning);
        cam.reset_view();
        assert_eq!(cam.bounds.min, Vec2::ZERO);
        assert!((cam.bounds.size() - Vec2::new(1000.0, 796.0)).length() < 1e-2);
    }

    #[test]
    fn test_resize_rebases_size() {
        let mut cam = camera();
        cam.bounds.translate(Vec2::new(300.0, 0.0));
        cam.resize(Viewport::new(1200.0, 600.0));
        assert_eq!(cam.bounds.min, Vec2::new(300.0, 0.0));
        assert_eq!(cam.bounds.size(), Vec2::new(1200.0, 600.0));

        // Degenerate sizes are ignored
        cam.resize(Viewport::new(0.0, 600.0));
        assert_eq!(cam.bounds.size(), Vec2::new(1200.0, 600.0));
    }

    proptest! {
        #[test]
        fn prop_zoom_stays_in_envelope(notches in proptest::collection::vec(-20i32..20, 1..40)) {
            let tuning = Tuning::default();
            let mut cam = camera();
            for n in notches {
                cam.idle(None, n, &tuning);
                prop_assert!(cam.scale_target() >= tuning.zoom_min && cam.scale_target() <= tuning.zoom_max);
                prop_assert!(cam.scale() >= tuning.zoom_min - 1e-4 && cam.scale() <= tuning.zoom_max + 1e-4);
            }
        }

        #[test]
        fn prop_pan_stays_within_extents(
            start in 0.0f32..4000.0,
            pointers in proptest::collection::vec((-200.0f32..1200.0, -200.0f32..1000.0), 1..200),
        ) {
            let tuning = Tuning::default();
            let mut cam = camera();
            cam.bounds.translate(Vec2::new(start, 0.0));
            let size = cam.bounds.size();
            for (x, y) in pointers {
                cam.pan(Vec2::new(x, y), &tuning);
                prop_assert!(cam.bounds.within(&cam.extents()));
                prop_assert!((cam.bounds.size() - size).length() < 1e-2);
            }
        }

        #[test]
        fn prop_follow_keeps_size(targets in proptest::collection::vec(-1000.0f32..6000.0, 1..100)) {
            let mut cam = camera();
            let size = cam.bounds.size();
            let y = cam.bounds.min.y;
            for t in targets {
                cam.follow(t, 0.2);
                prop_assert!((cam.bounds.size().x - size.x).abs() < 0.05);
                prop_assert_eq!(cam.bounds.min.y, y);
            }
        }
    }
}
