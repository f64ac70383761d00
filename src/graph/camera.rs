//! Camera2D - pan/zoom over graph space
//!
//! Maps graph coordinates (what the layout produces) to screen coordinates
//! inside the widget rect and back. State is UI-only and polled each frame.
//!
//! - `fit_to_bounds` - center on a world rect and zoom so it fills the view
//! - `pan` - drag by a screen delta
//! - `zoom_at` - scroll zoom keeping the point under the cursor fixed

use egui::{Pos2, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// View center in graph coordinates
    center: Pos2,
    /// 1.0 = one graph unit per point
    zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            center: Pos2::ZERO,
            zoom: 1.0,
            min_zoom: 0.05,
            max_zoom: 5.0,
        }
    }
}

impl Camera2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn reset(&mut self) {
        self.center = Pos2::ZERO;
        self.zoom = 1.0;
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    /// Pan by a delta in screen coordinates
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.center -= screen_delta / self.zoom;
    }

    /// Zoom by `factor`, keeping `screen_pos` over the same graph point
    pub fn zoom_at(&mut self, factor: f32, screen_pos: Pos2, screen_rect: Rect) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return;
        }
        let from_center = screen_pos - screen_rect.center();
        self.center += from_center / old_zoom - from_center / new_zoom;
        self.zoom = new_zoom;
    }

    /// Center on `bounds` and zoom so it fits inside `screen_rect` less
    /// `padding` on every side. Never zooms in past 1.0, so small graphs
    /// keep their natural size.
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen_rect: Rect, padding: f32) {
        if !bounds.is_finite() || bounds.is_negative() {
            return;
        }
        self.center = bounds.center();

        let available = (screen_rect.size() - Vec2::splat(2.0 * padding)).max(Vec2::splat(1.0));
        let zoom_x = available.x / bounds.width().max(1.0);
        let zoom_y = available.y / bounds.height().max(1.0);
        self.zoom = zoom_x.min(zoom_y).min(1.0).clamp(self.min_zoom, self.max_zoom);
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world_pos: Pos2, screen_rect: Rect) -> Pos2 {
        screen_rect.center() + (world_pos - self.center) * self.zoom
    }

    pub fn screen_to_world(&self, screen_pos: Pos2, screen_rect: Rect) -> Pos2 {
        self.center + (screen_pos - screen_rect.center()) / self.zoom
    }

    /// Graph-space rect currently on screen
    pub fn visible_bounds(&self, screen_rect: Rect) -> Rect {
        Rect::from_center_size(self.center, screen_rect.size() / self.zoom)
    }
}

/// Bounding box of `positions` grown by `margin` on every side.
/// `None` for an empty slice.
pub fn bounds_of(positions: &[Pos2], margin: f32) -> Option<Rect> {
    let first = *positions.first()?;
    let rect = positions
        .iter()
        .fold(Rect::from_min_max(first, first), |rect, &p| rect.union(Rect::from_min_max(p, p)));
    Some(rect.expand(margin))
}
