//! Mouse movement, button and wheel handling.

use crate::event::InputKind;
use crate::platform::RawMouse;
use crate::state::{MouseButtons, MouseState, Point, Rect};
use serde::{Deserialize, Serialize};

/// Inclusive wheel range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelRange {
    pub min: i32,
    pub max: i32,
}

impl WheelRange {
    pub fn clamp(&self, value: i32) -> i32 {
        value.max(self.min).min(self.max)
    }
}

/// Optional limits applied to the pointer position and wheel accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MouseConstraints {
    pub position: Option<Rect>,
    pub wheel: Option<WheelRange>,
}

impl MouseConstraints {
    /// Clamp `position` into the rectangle. A clamped axis zeroes its component of `relative`.
    pub fn constrain_position(&self, mut position: Point, relative: &mut Point) -> Point {
        let Some(rect) = self.position.filter(|r| !r.is_empty()) else {
            return position;
        };
        if position.x < rect.x {
            position.x = rect.x;
            relative.x = 0;
        } else if position.x > rect.right() {
            position.x = rect.right();
            relative.x = 0;
        }
        if position.y < rect.y {
            position.y = rect.y;
            relative.y = 0;
        } else if position.y > rect.bottom() {
            position.y = rect.bottom();
            relative.y = 0;
        }
        position
    }

    pub fn constrain_wheel(&self, wheel: i32) -> i32 {
        match self.wheel {
            Some(range) => range.clamp(wheel),
            None => wheel,
        }
    }
}

const BUTTON_TRANSITIONS: [(MouseButtons, u16, u16); 5] = [
    (MouseButtons::LEFT, RawMouse::LEFT_DOWN, RawMouse::LEFT_UP),
    (MouseButtons::RIGHT, RawMouse::RIGHT_DOWN, RawMouse::RIGHT_UP),
    (MouseButtons::MIDDLE, RawMouse::MIDDLE_DOWN, RawMouse::MIDDLE_UP),
    (MouseButtons::BUTTON4, RawMouse::BUTTON4_DOWN, RawMouse::BUTTON4_UP),
    (MouseButtons::BUTTON5, RawMouse::BUTTON5_DOWN, RawMouse::BUTTON5_UP),
];

/// Fold one raw mouse packet into `state`, returning the edges it produced
/// (move first, then wheel, then button transitions).
pub fn apply(raw: &RawMouse, state: &mut MouseState, constraints: &MouseConstraints) -> Vec<InputKind> {
    let mut out = Vec::new();

    let (target, mut relative) = if raw.absolute {
        let target = Point::new(raw.x, raw.y);
        let relative = state
            .last_absolute
            .map(|last| Point::new(target.x.saturating_sub(last.x), target.y.saturating_sub(last.y)))
            .unwrap_or_default();
        (target, relative)
    } else {
        (
            Point::new(state.position.x.saturating_add(raw.x), state.position.y.saturating_add(raw.y)),
            Point::new(raw.x, raw.y),
        )
    };
    let target = constraints.constrain_position(target, &mut relative);
    if raw.absolute {
        state.last_absolute = Some(target);
    }
    if target != state.position {
        state.position = target;
        state.relative = relative;
        out.push(InputKind::MouseMove {
            position: target,
            relative,
        });
    }

    if raw.button_flags & RawMouse::WHEEL != 0 && raw.wheel_delta != 0 {
        let delta = raw.wheel_delta as i32;
        state.wheel_delta = delta;
        state.wheel = constraints.constrain_wheel(state.wheel.saturating_add(delta));
        out.push(InputKind::MouseWheel {
            delta,
            wheel: state.wheel,
        });
    }

    for (button, down, up) in BUTTON_TRANSITIONS {
        if raw.button_flags & down != 0 {
            state.buttons |= button;
            out.push(InputKind::MouseButtonDown {
                button,
                position: state.position,
            });
        }
        if raw.button_flags & up != 0 {
            state.buttons &= !button;
            out.push(InputKind::MouseButtonUp {
                button,
                position: state.position,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_motion_accumulates() {
        let mut state = MouseState::default();
        let none = MouseConstraints::default();
        apply(&RawMouse::moved(5, -3), &mut state, &none);
        let events = apply(&RawMouse::moved(2, 2), &mut state, &none);
        assert_eq!(state.position, Point::new(7, -1));
        assert_eq!(
            events,
            vec![InputKind::MouseMove {
                position: Point::new(7, -1),
                relative: Point::new(2, 2)
            }]
        );
    }

    #[test]
    fn absolute_motion_derives_relative_from_last_sample() {
        let mut state = MouseState::default();
        let none = MouseConstraints::default();
        let abs = |x, y| RawMouse {
            absolute: true,
            x,
            y,
            ..RawMouse::default()
        };
        apply(&abs(100, 100), &mut state, &none);
        assert_eq!(state.relative, Point::new(0, 0));
        apply(&abs(110, 90), &mut state, &none);
        assert_eq!(state.relative, Point::new(10, -10));
    }

    #[test]
    fn position_is_clamped_and_offset_zeroed() {
        let constraints = MouseConstraints {
            position: Some(Rect {
                x: 330,
                y: 210,
                width: 150,
                height: 150,
            }),
            wheel: None,
        };
        let mut state = MouseState::default();
        apply(&RawMouse::moved(320, 500), &mut state, &constraints);
        assert_eq!(state.position, Point::new(330, 360));
        assert_eq!(state.relative, Point::new(0, 0));
    }

    #[test]
    fn extreme_absolute_jump_saturates() {
        let mut state = MouseState::default();
        let none = MouseConstraints::default();
        let abs = |x, y| RawMouse {
            absolute: true,
            x,
            y,
            ..RawMouse::default()
        };
        apply(&abs(i32::MIN, i32::MAX), &mut state, &none);
        apply(&abs(i32::MAX, i32::MIN), &mut state, &none);
        assert_eq!(state.relative, Point::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn rect_at_the_edge_of_i32_still_clamps() {
        let constraints = MouseConstraints {
            position: Some(Rect {
                x: i32::MAX - 10,
                y: 0,
                width: 100,
                height: 100,
            }),
            wheel: None,
        };
        let mut state = MouseState::default();
        apply(&RawMouse::moved(50, 50), &mut state, &constraints);
        assert_eq!(state.position, Point::new(i32::MAX - 10, 50));
        assert_eq!(state.relative, Point::new(0, 50));
    }

    #[test]
    fn unchanged_position_emits_nothing() {
        let mut state = MouseState::default();
        assert!(apply(&RawMouse::moved(0, 0), &mut state, &MouseConstraints::default()).is_empty());
    }

    #[test]
    fn wheel_is_clamped() {
        let constraints = MouseConstraints {
            position: None,
            wheel: Some(WheelRange { min: 180, max: 190 }),
        };
        let mut state = MouseState::default();
        let raw = RawMouse {
            button_flags: RawMouse::WHEEL,
            wheel_delta: 120,
            ..RawMouse::default()
        };
        apply(&raw, &mut state, &constraints);
        assert_eq!(state.wheel, 180);
        assert_eq!(state.wheel_delta, 120);
        apply(&raw, &mut state, &constraints);
        assert_eq!(state.wheel, 190);
    }

    #[test]
    fn button_transitions_update_flags() {
        let mut state = MouseState::default();
        let none = MouseConstraints::default();
        let raw = RawMouse {
            button_flags: RawMouse::LEFT_DOWN | RawMouse::BUTTON5_DOWN,
            ..RawMouse::default()
        };
        let events = apply(&raw, &mut state, &none);
        assert_eq!(events.len(), 2);
        assert_eq!(state.buttons, MouseButtons::LEFT | MouseButtons::BUTTON5);

        let raw = RawMouse {
            button_flags: RawMouse::LEFT_UP,
            ..RawMouse::default()
        };
        apply(&raw, &mut state, &none);
        assert_eq!(state.buttons, MouseButtons::BUTTON5);
    }
}
