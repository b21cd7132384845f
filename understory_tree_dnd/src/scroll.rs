// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge-band auto-scroll.

/// Auto-scroll parameters.
///
/// While the pointer is within the band at the top or bottom of the
/// viewport, each move scrolls the content by `step` toward that edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AutoScroll {
    /// Band height as a fraction of the viewport height.
    pub fraction: f64,
    /// Upper limit on the band height.
    pub cap: f64,
    /// Pixels scrolled per move inside the band.
    pub step: f64,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self {
            fraction: 0.15,
            cap: 100.0,
            step: 2.0,
        }
    }
}

impl AutoScroll {
    /// Band height for a viewport.
    pub fn band(&self, viewport_height: f64) -> f64 {
        (viewport_height * self.fraction).min(self.cap)
    }

    /// Scroll delta for a pointer at `y`, or `None` outside both bands.
    ///
    /// Negative deltas scroll up.
    pub fn step_for(&self, y: f64, viewport_height: f64) -> Option<f64> {
        let band = self.band(viewport_height);
        if y < band {
            Some(-self.step)
        } else if y > viewport_height - band {
            Some(self.step)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_is_capped() {
        let s = AutoScroll::default();
        assert_eq!(s.band(400.0), 60.0);
        assert_eq!(s.band(2_000.0), 100.0);
    }

    #[test]
    fn steps_toward_the_near_edge() {
        let s = AutoScroll::default();
        assert_eq!(s.step_for(10.0, 1_000.0), Some(-2.0));
        assert_eq!(s.step_for(500.0, 1_000.0), None);
        assert_eq!(s.step_for(950.0, 1_000.0), Some(2.0));
        assert_eq!(s.step_for(100.0, 1_000.0), None);
        assert_eq!(s.step_for(900.0, 1_000.0), None);
    }
}
