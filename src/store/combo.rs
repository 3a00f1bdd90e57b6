//! Consecutive-eat combo tracking

use serde::Serialize;

use crate::core::types::Timestamp;

/// Stepped reward multiplier for a combo count
pub fn combo_multiplier(count: u32) -> f32 {
    match count {
        10.. => 3.0,
        5..=9 => 2.0,
        3..=4 => 1.5,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComboTracker {
    count: u32,
    last_eat: Option<Timestamp>,
    window: f64,
}

impl ComboTracker {
    pub fn new(window: f64) -> Self {
        Self {
            count: 0,
            last_eat: None,
            window,
        }
    }

    /// Register an eat event and return the new combo count.
    ///
    /// An eat strictly inside the window of the previous one extends the
    /// combo; a gap of `window` or more starts over at 1.
    pub fn register(&mut self, now: Timestamp) -> u32 {
        self.count = match self.last_eat {
            Some(last) if now - last < self.window => self.count + 1,
            _ => 1,
        };
        self.last_eat = Some(now);
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn multiplier(&self) -> f32 {
        combo_multiplier(self.count)
    }

    /// Whether the next eat at `now` would still extend the combo
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.last_eat.is_some_and(|last| now - last < self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_steps() {
        assert_eq!(combo_multiplier(0), 1.0);
        assert_eq!(combo_multiplier(2), 1.0);
        assert_eq!(combo_multiplier(3), 1.5);
        assert_eq!(combo_multiplier(4), 1.5);
        assert_eq!(combo_multiplier(5), 2.0);
        assert_eq!(combo_multiplier(9), 2.0);
        assert_eq!(combo_multiplier(10), 3.0);
        assert_eq!(combo_multiplier(50), 3.0);
    }

    #[test]
    fn test_three_quick_eats_reach_one_point_five() {
        let mut combo = ComboTracker::new(2.0);
        combo.register(0.0);
        combo.register(1.5);
        assert_eq!(combo.register(3.0), 3);
        assert_eq!(combo.multiplier(), 1.5);
    }

    #[test]
    fn test_long_gap_resets_to_one() {
        let mut combo = ComboTracker::new(2.0);
        combo.register(0.0);
        combo.register(1.0);
        assert_eq!(combo.register(3.5), 1);
    }

    #[test]
    fn test_gap_equal_to_window_resets() {
        let mut combo = ComboTracker::new(2.0);
        combo.register(0.0);
        assert_eq!(combo.register(2.0), 1);
    }

    #[test]
    fn test_liveness() {
        let mut combo = ComboTracker::new(2.0);
        assert!(!combo.is_live(0.0));
        combo.register(1.0);
        assert!(combo.is_live(2.9));
        assert!(!combo.is_live(3.0));
    }
}
