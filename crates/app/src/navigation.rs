//! Swipe navigation between dashboard tabs.

use crate::gesture::SwipeDirection;

/// Ordered tabs with one active. Swiping left moves to the next tab,
/// swiping right to the previous one; both ends are sticky.
#[derive(Debug, Clone, Default)]
pub struct TabNavigator {
    tabs: Vec<String>,
    active: usize,
}

impl TabNavigator {
    #[must_use]
    pub fn new(tabs: Vec<String>) -> Self {
        Self { tabs, active: 0 }
    }

    #[must_use]
    pub fn active(&self) -> Option<(usize, &str)> {
        self.tabs.get(self.active).map(|tab| (self.active, tab.as_str()))
    }

    /// Apply a swipe. Returns the newly active tab when it changed.
    pub fn on_swipe(&mut self, direction: SwipeDirection) -> Option<(usize, &str)> {
        let target = match direction {
            SwipeDirection::Left => self.active + 1,
            SwipeDirection::Right => self.active.checked_sub(1)?,
            SwipeDirection::Up | SwipeDirection::Down => return None,
        };
        if target >= self.tabs.len() {
            return None;
        }
        self.active = target;
        self.active()
    }

    /// Activate a tab by name.
    pub fn select(&mut self, tab: &str) -> Option<usize> {
        let index = self.tabs.iter().position(|t| t == tab)?;
        self.active = index;
        Some(index)
    }
}
