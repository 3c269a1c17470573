//! Page navigation with a single-gesture debounce.
//!
//! Every accepted gesture takes a binary lock that is released after a fixed
//! cool-down. While it is held every further gesture is rejected outright,
//! so one physical wheel flick or swipe moves exactly one page. Time is passed
//! in by the caller; the navigator never reads the clock itself.

use std::time::{Duration, Instant};

use tracing::trace;

/// Keys that move between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    PageDown,
    Up,
    PageUp,
    Home,
    End,
}

/// One raw navigation gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Vertical wheel movement; positive scrolls towards later pages.
    Wheel { delta_y: f64 },
    /// Touch swipe. An upward swipe (`start_y > end_y`) goes to the next page.
    Swipe { start_y: f64, end_y: f64, elapsed: Duration },
    Key(NavKey),
}

/// Why a navigation request did not change the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// A previous gesture is still inside its cool-down.
    Transitioning,
    /// The target page is below zero or past the last page.
    OutOfBounds,
    /// The target is the page already shown.
    SamePage,
    /// The gesture was too small or too slow to count.
    BelowThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavConfig {
    pub cooldown: Duration,
    /// Minimum absolute wheel delta, exclusive.
    pub wheel_threshold: f64,
    /// Minimum swipe distance, exclusive.
    pub swipe_min_distance: f64,
    /// Maximum swipe duration, exclusive.
    pub swipe_max_duration: Duration,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(300),
            wheel_threshold: 50.0,
            swipe_min_distance: 50.0,
            swipe_max_duration: Duration::from_millis(500),
        }
    }
}

/// Where a gesture wants to go.
enum Target {
    Delta(isize),
    Absolute(isize),
}

#[derive(Debug, Clone)]
pub struct PageNavigator {
    page: usize,
    page_count: usize,
    locked_until: Option<Instant>,
    config: NavConfig,
}

impl PageNavigator {
    pub fn new(page_count: usize, config: NavConfig) -> Self {
        Self { page: 0, page_count, locked_until: None, config }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Index of the last page; `None` for an empty document.
    pub fn max_page(&self) -> Option<usize> {
        self.page_count.checked_sub(1)
    }

    /// True while the cool-down of the last accepted gesture is running.
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Replaces the page count, clamping the current page into range.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.page = self.page.min(page_count.saturating_sub(1));
    }

    /// Interprets `gesture` and, if it maps to a valid page change, applies it
    /// and starts the cool-down.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejected`] reason when the page does not change.
    pub fn request(&mut self, gesture: Gesture, now: Instant) -> Result<usize, Rejected> {
        if self.is_transitioning(now) {
            return Err(Rejected::Transitioning);
        }
        let target = match self.interpret(gesture)? {
            Target::Delta(delta) => self.page as isize + delta,
            Target::Absolute(page) => page,
        };
        self.request_page(target, now)
    }

    /// Requests an absolute page index, which may be out of range.
    pub fn request_page(&mut self, target: isize, now: Instant) -> Result<usize, Rejected> {
        if self.is_transitioning(now) {
            return Err(Rejected::Transitioning);
        }
        let target = self.in_bounds(target)?;
        if target == self.page {
            return Err(Rejected::SamePage);
        }
        trace!(from = self.page, to = target, "page changed");
        self.page = target;
        self.locked_until = Some(now + self.config.cooldown);
        Ok(target)
    }

    /// Programmatic jump, e.g. to the page of a selected diff. Bounds-checked
    /// but ignores and does not take the gesture lock.
    pub fn jump_to(&mut self, page: usize) -> Result<usize, Rejected> {
        let page = self.in_bounds(page as isize)?;
        self.page = page;
        Ok(page)
    }

    fn in_bounds(&self, target: isize) -> Result<usize, Rejected> {
        match self.max_page() {
            Some(max) if (0..=max as isize).contains(&target) => Ok(target as usize),
            _ => Err(Rejected::OutOfBounds),
        }
    }

    fn interpret(&self, gesture: Gesture) -> Result<Target, Rejected> {
        let c = &self.config;
        match gesture {
            Gesture::Wheel { delta_y } if delta_y > c.wheel_threshold => Ok(Target::Delta(1)),
            Gesture::Wheel { delta_y } if delta_y < -c.wheel_threshold => Ok(Target::Delta(-1)),
            Gesture::Wheel { .. } => Err(Rejected::BelowThreshold),
            Gesture::Swipe { start_y, end_y, elapsed } => {
                let distance = start_y - end_y;
                if distance.abs() > c.swipe_min_distance && elapsed < c.swipe_max_duration {
                    Ok(Target::Delta(if distance > 0.0 { 1 } else { -1 }))
                } else {
                    Err(Rejected::BelowThreshold)
                }
            }
            Gesture::Key(NavKey::Down | NavKey::PageDown) => Ok(Target::Delta(1)),
            Gesture::Key(NavKey::Up | NavKey::PageUp) => Ok(Target::Delta(-1)),
            Gesture::Key(NavKey::Home) => Ok(Target::Absolute(0)),
            Gesture::Key(NavKey::End) => {
                Ok(Target::Absolute(self.max_page().map_or(-1, |m| m as isize)))
            }
        }
    }
}
