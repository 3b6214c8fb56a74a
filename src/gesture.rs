// Pan recognition: raw pointer samples in, start/update out.
// Visual: a click without movement scratches nothing; the scratch begins once the mouse travels.

use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Start(Point),
    Update(Point),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PanState {
    Idle,
    Armed { origin: Point }, // pressed, not travelled far enough yet
    Active,
}

/// Single-pointer pan recognizer with a minimum travel distance before activation.
pub struct PanRecognizer {
    min_distance: f32,
    state: PanState,
}

impl PanRecognizer {
    pub fn new(min_distance: f32) -> Self {
        Self { min_distance: min_distance.max(0.0), state: PanState::Idle }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.state == PanState::Active
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<GestureEvent> {
        match (self.state, event) {
            (_, PointerEvent::Down(origin)) => {
                self.state = PanState::Armed { origin };
                None
            }
            (PanState::Armed { origin }, PointerEvent::Move(p)) => {
                if origin.distance(p) >= self.min_distance {
                    self.state = PanState::Active;
                    Some(GestureEvent::Start(p))
                } else {
                    None
                }
            }
            (PanState::Active, PointerEvent::Move(p)) => Some(GestureEvent::Update(p)),
            (PanState::Idle, PointerEvent::Move(_)) => None,
            (_, PointerEvent::Up) => {
                self.state = PanState::Idle;
                None
            }
        }
    }
}
