use crate::event::{Key, KeyEvent};

/// What the director does with a key event.
///
/// The simulation consumes actions, never raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Bank left while `held`; release returns the wings level.
    TurnLeft { held: bool },
    TurnRight { held: bool },
    /// Select the next faster polar entry.
    SpeedUp,
    /// Select the next slower polar entry.
    SlowDown,
    TogglePause,
    /// Move the camera to the next glider.
    NextFocus,
    /// Hand the focused glider back to its autopilot.
    Autopilot,
    Quit,
    /// Unbound key, or a release of a key that only acts on press.
    Noop,
}

impl Action {
    pub fn from_event(event: KeyEvent) -> Self {
        let KeyEvent { key, pressed } = event;
        match key {
            Key::Left => Action::TurnLeft { held: pressed },
            Key::Right => Action::TurnRight { held: pressed },
            _ if !pressed => Action::Noop,
            Key::Up => Action::SpeedUp,
            Key::Down => Action::SlowDown,
            Key::Space => Action::TogglePause,
            Key::Tab => Action::NextFocus,
            Key::Enter => Action::Autopilot,
            Key::Escape => Action::Quit,
            Key::Char(c) => match c.to_ascii_lowercase() {
                'p' => Action::TogglePause,
                'f' => Action::NextFocus,
                'a' => Action::Autopilot,
                'q' => Action::Quit,
                _ => Action::Noop,
            },
        }
    }
}

impl From<KeyEvent> for Action {
    fn from(event: KeyEvent) -> Self {
        Self::from_event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_steer_while_held() {
        assert_eq!(
            Action::from(KeyEvent::press(Key::Left)),
            Action::TurnLeft { held: true }
        );
        assert_eq!(
            Action::from(KeyEvent::release(Key::Right)),
            Action::TurnRight { held: false }
        );
    }

    #[test]
    fn one_shot_keys_ignore_release() {
        assert_eq!(Action::from(KeyEvent::press(Key::Space)), Action::TogglePause);
        assert_eq!(Action::from(KeyEvent::release(Key::Space)), Action::Noop);
        assert_eq!(Action::from(KeyEvent::press(Key::Up)), Action::SpeedUp);
    }

    #[test]
    fn letter_bindings_are_case_insensitive() {
        assert_eq!(Action::from(KeyEvent::press(Key::Char('P'))), Action::TogglePause);
        assert_eq!(Action::from(KeyEvent::press(Key::Char('f'))), Action::NextFocus);
        assert_eq!(Action::from(KeyEvent::press(Key::Char('z'))), Action::Noop);
    }
}
