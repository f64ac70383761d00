//! Layout transition animation
//!
//! Interpolates node positions from the layout seed to the settled result
//! over a fixed duration with an ease-out cubic curve.
//!
//! - No callbacks: call `tick(dt)` each frame, then read `positions()`
//! - A finished animation keeps returning the target positions

use egui::Pos2;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutAnimation {
    from: Vec<Pos2>,
    to: Vec<Pos2>,
    /// Seconds
    duration: f32,
    elapsed: f32,
}

impl LayoutAnimation {
    /// Animate `from` → `to`. Nodes without a start position begin at
    /// their target.
    pub fn new(from: Vec<Pos2>, to: Vec<Pos2>, duration_secs: f32) -> Self {
        let from = to
            .iter()
            .enumerate()
            .map(|(i, &target)| from.get(i).copied().unwrap_or(target))
            .collect();
        Self {
            from,
            to,
            duration: duration_secs.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Already at the target
    pub fn settled(to: Vec<Pos2>) -> Self {
        Self {
            from: to.clone(),
            to,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }

    /// Progress in 0.0 - 1.0 (eased)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ease_out_cubic(self.elapsed / self.duration)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Jump to the end
    pub fn complete_immediately(&mut self) {
        self.elapsed = self.duration;
    }

    /// Current interpolated positions
    pub fn positions(&self) -> Vec<Pos2> {
        let t = self.progress();
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| a.lerp(*b, t))
            .collect()
    }

    /// Final positions
    pub fn target(&self) -> &[Pos2] {
        &self.to
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
