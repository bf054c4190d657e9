//! Raw key events to player commands.
//!
//! A second press of the same direction within the double-tap window becomes
//! a dash in that direction instead of a move.

use serde::{Deserialize, Serialize};

use crate::components::Direction;
use crate::systems::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    Shoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventKind {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: KeyEventKind,
    /// Wall-clock timestamp, only compared against other events
    pub time_ms: u64,
}

impl KeyEvent {
    pub fn press(key: Key, time_ms: u64) -> Self {
        Self {
            key,
            kind: KeyEventKind::Press,
            time_ms,
        }
    }

    pub fn release(key: Key, time_ms: u64) -> Self {
        Self {
            key,
            kind: KeyEventKind::Release,
            time_ms,
        }
    }
}

/// Directions held down at the end of the frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn is_held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// Everything the input layer observed during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pub held: HeldKeys,
    pub events: Vec<KeyEvent>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: KeyEvent) -> Self {
        match (event.key, event.kind) {
            (Key::Left, KeyEventKind::Press) => self.held.left = true,
            (Key::Left, KeyEventKind::Release) => self.held.left = false,
            (Key::Right, KeyEventKind::Press) => self.held.right = true,
            (Key::Right, KeyEventKind::Release) => self.held.right = false,
            _ => {}
        }
        self.events.push(event);
        self
    }
}

fn direction_of(key: Key) -> Option<Direction> {
    match key {
        Key::Left => Some(Direction::Left),
        Key::Right => Some(Direction::Right),
        _ => None,
    }
}

fn move_command(dir: Direction) -> Command {
    match dir {
        Direction::Left => Command::MoveLeft,
        Direction::Right => Command::MoveRight,
    }
}

/// Stateful translator; remembers the last press per direction
#[derive(Debug, Clone)]
pub struct InputTranslator {
    double_tap_ms: u64,
    last_press: [Option<u64>; 2],
}

impl InputTranslator {
    pub fn new(double_tap_ms: u64) -> Self {
        Self {
            double_tap_ms,
            last_press: [None, None],
        }
    }

    fn slot(dir: Direction) -> usize {
        match dir {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }

    pub fn translate(&mut self, frame: &InputFrame) -> Vec<Command> {
        let mut commands = Vec::with_capacity(frame.events.len());
        for event in &frame.events {
            match (event.kind, direction_of(event.key)) {
                (KeyEventKind::Press, Some(dir)) => {
                    let slot = Self::slot(dir);
                    let double_tap = self.last_press[slot]
                        .map_or(false, |last| event.time_ms.saturating_sub(last) < self.double_tap_ms);
                    self.last_press[slot] = Some(event.time_ms);
                    if double_tap {
                        commands.push(Command::Dash(dir));
                    } else {
                        commands.push(move_command(dir));
                    }
                }
                (KeyEventKind::Release, Some(dir)) => {
                    let other = dir.opposite();
                    if frame.held.is_held(other) {
                        commands.push(move_command(other));
                    } else {
                        commands.push(Command::Stop);
                    }
                }
                (KeyEventKind::Press, None) => match event.key {
                    Key::Jump => commands.push(Command::Jump),
                    Key::Shoot => commands.push(Command::Shoot),
                    _ => {}
                },
                (KeyEventKind::Release, None) => {}
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_one(t: &mut InputTranslator, event: KeyEvent) -> Vec<Command> {
        t.translate(&InputFrame::idle().with_event(event))
    }

    #[test]
    fn test_double_tap_becomes_dash() {
        let mut t = InputTranslator::new(200);
        assert_eq!(translate_one(&mut t, KeyEvent::press(Key::Right, 1000)), vec![Command::MoveRight]);
        translate_one(&mut t, KeyEvent::release(Key::Right, 1050));
        assert_eq!(
            translate_one(&mut t, KeyEvent::press(Key::Right, 1150)),
            vec![Command::Dash(Direction::Right)]
        );
    }

    #[test]
    fn test_third_quick_tap_dashes_again() {
        let mut t = InputTranslator::new(200);
        translate_one(&mut t, KeyEvent::press(Key::Right, 0));
        assert_eq!(
            translate_one(&mut t, KeyEvent::press(Key::Right, 150)),
            vec![Command::Dash(Direction::Right)]
        );
        // Measured from the previous press, not the first one
        assert_eq!(
            translate_one(&mut t, KeyEvent::press(Key::Right, 300)),
            vec![Command::Dash(Direction::Right)]
        );
    }

    #[test]
    fn test_slow_second_tap_is_a_move() {
        let mut t = InputTranslator::new(200);
        translate_one(&mut t, KeyEvent::press(Key::Left, 0));
        assert_eq!(translate_one(&mut t, KeyEvent::press(Key::Left, 200)), vec![Command::MoveLeft]);
    }

    #[test]
    fn test_taps_are_tracked_per_direction() {
        let mut t = InputTranslator::new(200);
        translate_one(&mut t, KeyEvent::press(Key::Left, 0));
        assert_eq!(translate_one(&mut t, KeyEvent::press(Key::Right, 50)), vec![Command::MoveRight]);
    }

    #[test]
    fn test_release_falls_back_to_other_held_direction() {
        let mut t = InputTranslator::new(200);
        let frame = InputFrame::idle()
            .with_event(KeyEvent::press(Key::Left, 0))
            .with_event(KeyEvent::press(Key::Right, 10))
            .with_event(KeyEvent::release(Key::Right, 20));
        assert_eq!(
            t.translate(&frame),
            vec![Command::MoveLeft, Command::MoveRight, Command::MoveLeft]
        );

        let frame = InputFrame::idle().with_event(KeyEvent::release(Key::Left, 500));
        assert_eq!(t.translate(&frame), vec![Command::Stop]);
    }

    #[test]
    fn test_actions() {
        let mut t = InputTranslator::new(200);
        let frame = InputFrame::idle()
            .with_event(KeyEvent::press(Key::Jump, 0))
            .with_event(KeyEvent::release(Key::Jump, 5))
            .with_event(KeyEvent::press(Key::Shoot, 6));
        assert_eq!(t.translate(&frame), vec![Command::Jump, Command::Shoot]);
    }
}
