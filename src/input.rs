// Turns polled mouse state into discrete pointer events for the stroke frame.
// minifb only tells us "button is down" and "mouse is here" each tick, so the
// down/move/up/leave edges are reconstructed here.

use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

#[derive(Default)]
pub struct PointerTracker {
    /// Button was down on the previous tick.
    was_down: bool,
    /// The current press started on the frame and has not left it yet.
    tracking: bool,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick of mouse state. `local` is the frame-local position, or
    /// `None` when the pointer is outside the frame.
    pub fn update(&mut self, button_down: bool, local: Option<Point>) -> Option<PointerEvent> {
        let pressed = button_down && !self.was_down;
        self.was_down = button_down;

        if !button_down {
            let was_tracking = std::mem::take(&mut self.tracking);
            self.last = None;
            return was_tracking.then_some(PointerEvent::Up);
        }

        if pressed {
            // A press only counts when it lands on the frame.
            let p = local?;
            self.tracking = true;
            self.last = Some(p);
            return Some(PointerEvent::Down(p));
        }

        if !self.tracking {
            return None;
        }
        match local {
            None => {
                self.tracking = false;
                self.last = None;
                Some(PointerEvent::Leave)
            }
            Some(p) if self.last == Some(p) => None,
            Some(p) => {
                self.last = Some(p);
                Some(PointerEvent::Move(p))
            }
        }
    }
}
