//! Drag State Tracker.
//!
//! Drag-enter/leave events arrive in nested pairs as the pointer crosses
//! child widgets.  Counting them gives a flicker-free "dragging over" state:
//! the affordance switches on at depth 0→1 and off when depth returns to 0.

/// Nested enter/leave counter for the whole window.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    depth: i32,
    over: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net unmatched enter events.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Whether the drop affordance is shown.
    pub fn is_dragging_over(&self) -> bool {
        self.over
    }

    pub fn on_drag_enter(&mut self) {
        self.depth += 1;
        if self.depth == 1 {
            self.over = true;
        }
    }

    pub fn on_drag_leave(&mut self) {
        self.depth -= 1;
        if self.depth == 0 {
            self.over = false;
        }
    }

    /// Called for every drag-over event.  The drop target always accepts, so
    /// this always returns `true`; depth is unaffected.
    pub fn on_drag_over(&self) -> bool {
        true
    }

    /// Reset regardless of prior depth so the affordance can never stick.
    pub fn on_drop(&mut self) {
        self.depth = 0;
        self.over = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let t = DragTracker::new();
        assert_eq!(t.depth(), 0);
        assert!(!t.is_dragging_over());
    }

    #[test]
    fn nested_enters_keep_affordance_until_last_leave() {
        let mut t = DragTracker::new();
        t.on_drag_enter();
        t.on_drag_enter();
        t.on_drag_enter();
        assert!(t.is_dragging_over());

        t.on_drag_leave();
        t.on_drag_leave();
        assert!(t.is_dragging_over());
        assert_eq!(t.depth(), 1);

        t.on_drag_leave();
        assert!(!t.is_dragging_over());
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn depth_is_enters_minus_leaves() {
        let mut t = DragTracker::new();
        let events = [true, true, false, true, false, false, true];
        let mut expected = 0;
        for enter in events {
            if enter {
                t.on_drag_enter();
                expected += 1;
            } else {
                t.on_drag_leave();
                expected -= 1;
            }
            assert_eq!(t.depth(), expected);
            if expected <= 0 {
                assert!(!t.is_dragging_over());
            }
        }
    }

    #[test]
    fn unmatched_leave_never_shows_affordance() {
        let mut t = DragTracker::new();
        t.on_drag_leave();
        assert_eq!(t.depth(), -1);
        assert!(!t.is_dragging_over());

        // Back to zero: still off, since only 0→1 switches it on.
        t.on_drag_enter();
        assert_eq!(t.depth(), 0);
        assert!(!t.is_dragging_over());
    }

    #[test]
    fn drop_resets_from_any_depth() {
        let mut t = DragTracker::new();
        t.on_drag_enter();
        t.on_drag_enter();
        t.on_drop();
        assert_eq!(t.depth(), 0);
        assert!(!t.is_dragging_over());

        t.on_drag_leave();
        t.on_drag_leave();
        t.on_drop();
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn drag_over_accepts_and_leaves_depth_alone() {
        let mut t = DragTracker::new();
        t.on_drag_enter();
        for _ in 0..10 {
            assert!(t.on_drag_over());
        }
        assert_eq!(t.depth(), 1);
    }
}
