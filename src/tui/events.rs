use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    Cancel,
    FocusNext,
    FocusPrev,
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    Submit,
    CyclePageSize,
    ExportAll,
    ExportEmailOnly,
    PromptLicense,
    PromptPremiumKey,
    Logout,
    RefreshStatus,
    Input(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

/// Throw away input typed while a blocking request was running
pub fn discard_pending_events() -> anyhow::Result<usize> {
    let mut discarded = 0;
    while event::poll(Duration::ZERO)? {
        event::read()?;
        discarded += 1;
    }
    Ok(discarded)
}

pub(crate) fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Cancel,

        // Focus
        (KeyCode::Tab, _) => Action::FocusNext,
        (KeyCode::BackTab, _) => Action::FocusPrev,

        // Navigation
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::Left, _) | (KeyCode::PageUp, _) => Action::PrevPage,
        (KeyCode::Right, _) | (KeyCode::PageDown, _) => Action::NextPage,

        // Commands
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Char('t'), KeyModifiers::CONTROL) => Action::CyclePageSize,
        (KeyCode::Char('e'), KeyModifiers::CONTROL) => Action::ExportAll,
        (KeyCode::Char('w'), KeyModifiers::CONTROL) => Action::ExportEmailOnly,
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Action::PromptLicense,
        (KeyCode::Char('k'), KeyModifiers::CONTROL) => Action::PromptPremiumKey,
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => Action::Logout,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Action::RefreshStatus,

        // Text input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::Input(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_quit_and_cancel() {
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Cancel);
    }

    #[test]
    fn test_focus_cycling() {
        assert_eq!(key_to_action(key(KeyCode::Tab)), Action::FocusNext);
        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(key_to_action(back_tab), Action::FocusPrev);
    }

    #[test]
    fn test_paging_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::PrevPage);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PrevPage);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::NextPage);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::NextPage);
        assert_eq!(key_to_action(ctrl('t')), Action::CyclePageSize);
    }

    #[test]
    fn test_row_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::MoveUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::MoveDown);
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(ctrl('e')), Action::ExportAll);
        assert_eq!(key_to_action(ctrl('w')), Action::ExportEmailOnly);
        assert_eq!(key_to_action(ctrl('l')), Action::PromptLicense);
        assert_eq!(key_to_action(ctrl('k')), Action::PromptPremiumKey);
        assert_eq!(key_to_action(ctrl('o')), Action::Logout);
        assert_eq!(key_to_action(ctrl('r')), Action::RefreshStatus);
    }

    #[test]
    fn test_text_input() {
        assert_eq!(key_to_action(key(KeyCode::Char('d'))), Action::Input('d'));
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Input(' '));
        let shifted = KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shifted), Action::Input('B'));
        assert_eq!(key_to_action(key(KeyCode::Backspace)), Action::DeleteChar);
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::None);
        assert_eq!(key_to_action(ctrl('z')), Action::None);
    }
}
