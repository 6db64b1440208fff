//! Input handling: keys and button clicks mapped to session actions.
//!
//! Every input goes through the same path whether it came from the
//! keyboard or the on-screen controls: [`Action::from_event`] picks at most
//! one action and [`dispatch`] applies them in order on the UI thread.

use crate::session::{PlayerLoader, PlaylistSession};

/// Keys the player reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    /// A printable character, as typed (shift gives uppercase)
    Char(char),
}

/// A discrete input delivered by the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    PreviousButton,
    NextButton,
    PlayPauseButton,
    /// Seek bar released at an absolute position in seconds
    SeekBar(f64),
}

/// What an input asks the session to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    TogglePlayback,
    SeekBackward,
    SeekForward,
    SeekTo(f64),
    Next,
    Previous,
    Quit,
}

/// Result of processing input, telling the app whether to keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
}

/// Shortcut legend printed at startup
pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("Space", "Play/Pause"),
    ("Left Arrow", "Seek backward 10 seconds"),
    ("Right Arrow", "Seek forward 10 seconds"),
    ("N", "Next video"),
    ("P", "Previous video"),
    ("Q", "Quit"),
];

impl Action {
    /// Map an input to its action. Unrecognized input maps to nothing.
    pub fn from_event(event: &InputEvent) -> Option<Self> {
        match *event {
            InputEvent::Key(Key::Space) => Some(Self::TogglePlayback),
            InputEvent::Key(Key::ArrowLeft) => Some(Self::SeekBackward),
            InputEvent::Key(Key::ArrowRight) => Some(Self::SeekForward),
            InputEvent::Key(Key::Char('n' | 'N')) => Some(Self::Next),
            InputEvent::Key(Key::Char('p' | 'P')) => Some(Self::Previous),
            InputEvent::Key(Key::Char('q' | 'Q')) => Some(Self::Quit),
            InputEvent::Key(Key::Char(_)) => None,
            InputEvent::PreviousButton => Some(Self::Previous),
            InputEvent::NextButton => Some(Self::Next),
            InputEvent::PlayPauseButton => Some(Self::TogglePlayback),
            InputEvent::SeekBar(position) => Some(Self::SeekTo(position)),
        }
    }

    /// Run the action against the session, printing transport status lines.
    pub fn apply<L: PlayerLoader>(self, session: &mut PlaylistSession<L>) -> InputResult {
        let status = match self {
            Self::TogglePlayback => session.toggle_playback(),
            Self::SeekBackward => session.seek_backward(),
            Self::SeekForward => session.seek_forward(),
            Self::SeekTo(position) => session.seek_to(position),
            Self::Next => {
                session.next();
                None
            }
            Self::Previous => {
                session.previous();
                None
            }
            Self::Quit => return InputResult::Quit,
        };

        if let Some(status) = status {
            println!("{status}");
        }
        InputResult::Continue
    }
}

/// Apply events in order. Stops at the first quit; later events are dropped.
pub fn dispatch<L, I>(session: &mut PlaylistSession<L>, events: I) -> InputResult
where
    L: PlayerLoader,
    I: IntoIterator<Item = InputEvent>,
{
    for event in events {
        let Some(action) = Action::from_event(&event) else {
            continue;
        };
        tracing::debug!(?event, ?action, "Input");
        if action.apply(session) == InputResult::Quit {
            tracing::info!("Quit requested");
            return InputResult::Quit;
        }
    }
    InputResult::Continue
}

/// Translate an egui key press into an input event.
pub fn from_egui(event: &egui::Event) -> Option<InputEvent> {
    let egui::Event::Key {
        key,
        pressed: true,
        modifiers,
        ..
    } = event
    else {
        return None;
    };

    let key = match key {
        egui::Key::Space => Key::Space,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::ArrowRight => Key::ArrowRight,
        other => {
            let name = other.name();
            let mut chars = name.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            if modifiers.shift {
                Key::Char(c.to_ascii_uppercase())
            } else {
                Key::Char(c.to_ascii_lowercase())
            }
        }
    };
    Some(InputEvent::Key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Transport;
    use crate::session::tests::session_with;

    fn key(c: char) -> InputEvent {
        InputEvent::Key(Key::Char(c))
    }

    #[test]
    fn letter_shortcuts_ignore_case() {
        for (lower, upper, action) in [
            ('n', 'N', Action::Next),
            ('p', 'P', Action::Previous),
            ('q', 'Q', Action::Quit),
        ] {
            assert_eq!(Action::from_event(&key(lower)), Some(action));
            assert_eq!(Action::from_event(&key(upper)), Some(action));
        }
    }

    #[test]
    fn buttons_map_to_navigation() {
        assert_eq!(
            Action::from_event(&InputEvent::PreviousButton),
            Some(Action::Previous)
        );
        assert_eq!(
            Action::from_event(&InputEvent::NextButton),
            Some(Action::Next)
        );
    }

    #[test]
    fn transport_controls_share_the_key_actions() {
        assert_eq!(
            Action::from_event(&InputEvent::PlayPauseButton),
            Action::from_event(&InputEvent::Key(Key::Space))
        );
        assert_eq!(
            Action::from_event(&InputEvent::SeekBar(42.5)),
            Some(Action::SeekTo(42.5))
        );
    }

    #[test]
    fn play_pause_button_toggles_like_space() {
        let (mut session, journal) = session_with(&["a.mp4"]);

        dispatch(&mut session, [InputEvent::PlayPauseButton]);
        assert_eq!(session.player().unwrap().rate(), 0.0);

        dispatch(&mut session, [InputEvent::PlayPauseButton]);
        assert_eq!(session.player().unwrap().rate(), 1.0);

        let tail: Vec<_> = journal.borrow().iter().rev().take(2).cloned().collect();
        assert_eq!(tail, vec!["play a.mp4", "pause a.mp4"]);
    }

    #[test]
    fn seek_bar_jumps_to_absolute_position() {
        let (mut session, journal) = session_with(&["a.mp4"]);

        dispatch(
            &mut session,
            [InputEvent::Key(Key::ArrowRight), InputEvent::SeekBar(42.5)],
        );

        assert_eq!(session.player().unwrap().position(), 42.5);
        assert_eq!(journal.borrow().last().map(String::as_str), Some("seek 42.5"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(Action::from_event(&key('x')), None);
        assert_eq!(Action::from_event(&key('1')), None);
    }

    #[test]
    fn space_toggles_playback() {
        let (mut session, _journal) = session_with(&["a.mp4"]);

        dispatch(&mut session, [InputEvent::Key(Key::Space)]);
        assert_eq!(session.player().unwrap().rate(), 0.0);

        dispatch(&mut session, [InputEvent::Key(Key::Space)]);
        assert_eq!(session.player().unwrap().rate(), 1.0);
    }

    #[test]
    fn arrows_seek_ten_seconds() {
        let (mut session, journal) = session_with(&["a.mp4"]);

        dispatch(
            &mut session,
            [
                InputEvent::Key(Key::ArrowRight),
                InputEvent::Key(Key::ArrowRight),
                InputEvent::Key(Key::ArrowLeft),
            ],
        );

        assert_eq!(session.player().unwrap().position(), 10.0);
        let seeks: Vec<_> = journal
            .borrow()
            .iter()
            .filter(|line| line.starts_with("seek"))
            .cloned()
            .collect();
        assert_eq!(seeks, vec!["seek 10", "seek 20", "seek 10"]);
    }

    #[test]
    fn navigation_scenario() {
        let (mut session, _journal) = session_with(&["a.mp4", "b.mp4"]);

        dispatch(&mut session, [InputEvent::NextButton]);
        assert_eq!(session.current_index(), 1);
        assert!(!session.can_next());
        assert!(session.can_previous());

        dispatch(&mut session, [key('n')]);
        assert_eq!(session.current_index(), 1);

        dispatch(&mut session, [key('P')]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn quit_stops_processing_remaining_events() {
        let (mut session, _journal) = session_with(&["a.mp4", "b.mp4"]);

        let result = dispatch(&mut session, [key('q'), InputEvent::NextButton]);

        assert_eq!(result, InputResult::Quit);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn egui_letter_keys_respect_shift() {
        let press = |key, shift| egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers {
                shift,
                ..Default::default()
            },
        };

        assert_eq!(from_egui(&press(egui::Key::N, false)), Some(key('n')));
        assert_eq!(from_egui(&press(egui::Key::N, true)), Some(key('N')));
        assert_eq!(
            from_egui(&press(egui::Key::ArrowLeft, false)),
            Some(InputEvent::Key(Key::ArrowLeft))
        );
        assert_eq!(from_egui(&press(egui::Key::Escape, false)), None);
    }

    #[test]
    fn egui_key_release_is_ignored() {
        let release = egui::Event::Key {
            key: egui::Key::Space,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: egui::Modifiers::default(),
        };
        assert_eq!(from_egui(&release), None);
    }
}
