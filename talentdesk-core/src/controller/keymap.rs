//! src/controller/keymap.rs
//! ============================================================================
//! # KeyMap: terminal events → actions
//!
//! Browse mode is a plain binding table. Search mode routes printable keys
//! into the search line and only keeps a few control bindings.

use std::collections::HashMap;

use crossterm::event::{
    Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use tracing::trace;

use crate::{controller::actions::Action, model::ui_state::UIMode};

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn plain(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub struct KeyMap {
    browse: HashMap<KeyEvent, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    pub fn new() -> Self {
        let mut browse = HashMap::with_capacity(32);

        browse.insert(key('q'), Action::Quit);
        browse.insert(ctrl('c'), Action::Quit);
        browse.insert(key('/'), Action::EnterSearch);

        // Datasets
        browse.insert(plain(KeyCode::Tab), Action::NextTab);
        browse.insert(plain(KeyCode::BackTab), Action::PrevTab);
        browse.insert(
            KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            Action::PrevTab,
        );

        // Rows and pages
        browse.insert(plain(KeyCode::Up), Action::MoveUp);
        browse.insert(plain(KeyCode::Down), Action::MoveDown);
        browse.insert(key('k'), Action::MoveUp);
        browse.insert(key('j'), Action::MoveDown);
        browse.insert(plain(KeyCode::Left), Action::PrevPage);
        browse.insert(plain(KeyCode::Right), Action::NextPage);
        browse.insert(key('p'), Action::PrevPage);
        browse.insert(key('n'), Action::NextPage);
        browse.insert(plain(KeyCode::Home), Action::FirstPage);
        browse.insert(plain(KeyCode::End), Action::LastPage);

        // Headers 1..=9
        for (index, digit) in ('1'..='9').enumerate() {
            browse.insert(key(digit), Action::ClickHeader(index));
        }

        browse.insert(key('f'), Action::CycleFilter);
        browse.insert(key('c'), Action::ClearFilters);
        browse.insert(key('x'), Action::DismissNewest);
        browse.insert(key('X'), Action::DismissAll);
        browse.insert(key('r'), Action::Reload);

        Self { browse }
    }

    pub fn map_event(&self, event: &TerminalEvent, mode: UIMode) -> Action {
        match event {
            TerminalEvent::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                self.map_key(*key_event, mode)
            }
            TerminalEvent::Mouse(mouse) => Self::map_mouse(*mouse),
            TerminalEvent::Resize(width, height) => Action::Resize(*width, *height),
            _ => Action::NoOp,
        }
    }

    fn map_key(&self, key_event: KeyEvent, mode: UIMode) -> Action {
        trace!(
            marker = "KEYMAP_KEY_EVENT",
            operation_type = "input_handling",
            mode = ?mode,
            "KeyMap: key {:?}",
            key_event
        );

        // Drop kind/state so lookups match the table entries
        let lookup = KeyEvent::new(key_event.code, key_event.modifiers);

        match mode {
            UIMode::Browse => self.browse.get(&lookup).cloned().unwrap_or(Action::NoOp),
            UIMode::Search => match lookup.code {
                KeyCode::Esc | KeyCode::Enter => Action::ExitSearch,
                KeyCode::Backspace => Action::DeleteChar,
                KeyCode::Left => Action::CursorLeft,
                KeyCode::Right => Action::CursorRight,
                KeyCode::Char('c') if lookup.modifiers.contains(KeyModifiers::CONTROL) => {
                    Action::Quit
                }
                KeyCode::Char(ch)
                    if !lookup
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    Action::InsertChar(ch)
                }
                _ => Action::NoOp,
            },
        }
    }

    fn map_mouse(mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Action::Click {
                x: mouse.column,
                y: mouse.row,
            },
            MouseEventKind::ScrollDown => Action::MoveDown,
            MouseEventKind::ScrollUp => Action::MoveUp,
            _ => Action::NoOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> TerminalEvent {
        TerminalEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_browse_bindings() {
        let map = KeyMap::new();
        let browse = |code, mods| map.map_event(&press(code, mods), UIMode::Browse);

        assert!(matches!(browse(KeyCode::Char('q'), KeyModifiers::NONE), Action::Quit));
        assert!(matches!(browse(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit));
        assert!(matches!(browse(KeyCode::Char('c'), KeyModifiers::NONE), Action::ClearFilters));
        assert!(matches!(browse(KeyCode::Char('3'), KeyModifiers::NONE), Action::ClickHeader(2)));
        assert!(matches!(browse(KeyCode::Char('X'), KeyModifiers::SHIFT), Action::DismissAll));
        assert!(matches!(browse(KeyCode::BackTab, KeyModifiers::SHIFT), Action::PrevTab));
        assert!(matches!(browse(KeyCode::Right, KeyModifiers::NONE), Action::NextPage));
        assert!(matches!(browse(KeyCode::F(5), KeyModifiers::NONE), Action::NoOp));
    }

    #[test]
    fn test_search_mode_types_letters() {
        let map = KeyMap::new();
        let search = |code, mods| map.map_event(&press(code, mods), UIMode::Search);

        assert!(matches!(search(KeyCode::Char('q'), KeyModifiers::NONE), Action::InsertChar('q')));
        assert!(matches!(search(KeyCode::Char('Q'), KeyModifiers::SHIFT), Action::InsertChar('Q')));
        assert!(matches!(search(KeyCode::Esc, KeyModifiers::NONE), Action::ExitSearch));
        assert!(matches!(search(KeyCode::Backspace, KeyModifiers::NONE), Action::DeleteChar));
        assert!(matches!(search(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit));
        assert!(matches!(search(KeyCode::Char('a'), KeyModifiers::ALT), Action::NoOp));
    }

    #[test]
    fn test_release_and_mouse_events() {
        let map = KeyMap::new();
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(matches!(
            map.map_event(&TerminalEvent::Key(release), UIMode::Browse),
            Action::NoOp
        ));

        let click = TerminalEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert!(matches!(
            map.map_event(&click, UIMode::Browse),
            Action::Click { x: 12, y: 4 }
        ));
        assert!(matches!(
            map.map_event(&TerminalEvent::Resize(80, 24), UIMode::Search),
            Action::Resize(80, 24)
        ));
    }
}
