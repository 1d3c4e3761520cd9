//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::models::Field;

/// Which screen is showing
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Screen {
    /// Asking for a session file path
    #[default]
    Prompt,
    Session,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    NextRecord,
    PrevRecord,
    NextFocus,
    PrevFocus,
    NextHeader,
    PrevHeader,
    ScrollUp,
    ScrollDown,

    // Text input
    StartEditing,
    StopEditing,
    CharInput(char),
    Newline,
    Backspace,
    CursorLeft,
    CursorRight,

    // Record actions
    AddRecord,
    RequestDelete,
    CycleMethod,
    Send,
    Save,

    // Headers
    StartHeaderInput,
    DeleteHeader,

    // Modals
    Confirm,
    Deny,
    ToggleHelp,

    // Prompt screen
    SubmitPrompt,

    // System
    /// Close the session and go back to the prompt
    Back,
    Quit,
}

/// Focused part of the selected record
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Focus {
    #[default]
    Name,
    Method,
    Url,
    Headers,
    Body,
    Response,
}

impl Focus {
    pub fn next(&self) -> Focus {
        match self {
            Focus::Name => Focus::Method,
            Focus::Method => Focus::Url,
            Focus::Url => Focus::Headers,
            Focus::Headers => Focus::Body,
            Focus::Body => Focus::Response,
            Focus::Response => Focus::Name,
        }
    }

    pub fn prev(&self) -> Focus {
        match self {
            Focus::Name => Focus::Response,
            Focus::Method => Focus::Name,
            Focus::Url => Focus::Method,
            Focus::Headers => Focus::Url,
            Focus::Body => Focus::Headers,
            Focus::Response => Focus::Body,
        }
    }

    /// The text field edited when this part is focused
    pub fn field(&self) -> Option<Field> {
        match self {
            Focus::Name => Some(Field::Name),
            Focus::Url => Some(Field::Url),
            Focus::Body => Some(Field::Body),
            Focus::Method | Focus::Headers | Focus::Response => None,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// What the text input buffer is for
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EditTarget {
    Field(Field),
    /// A new header typed as `Key: Value`
    NewHeader,
    Prompt,
}

/// Where to go once an exit is allowed
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ExitAction {
    Back,
    Quit,
}

/// Confirmation dialogs owned by the UI
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Modal {
    #[default]
    None,
    ConfirmDelete(usize),
    ConfirmExit(ExitAction),
}

/// The slice of UI state that decides what a key means
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct KeyContext {
    pub screen: Screen,
    pub modal: Modal,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub edit_target: Option<EditTarget>,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if ctx.screen == Screen::Session => return Some(UiEvent::Save),
            _ => {}
        }
    }

    // Popups first
    if ctx.show_help {
        return Some(UiEvent::ToggleHelp);
    }

    if ctx.modal != Modal::None {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(UiEvent::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(UiEvent::Deny),
            _ => None,
        };
    }

    match ctx.screen {
        Screen::Prompt => handle_prompt_keys(key),
        Screen::Session => match ctx.input_mode {
            InputMode::Normal => handle_session_keys(key, ctx.focus),
            InputMode::Editing => handle_editing_keys(key, ctx.edit_target),
        },
    }
}

/// The prompt screen is a single always-editing input
fn handle_prompt_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::Quit),
        KeyCode::Enter => Some(UiEvent::SubmitPrompt),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn handle_session_keys(key: KeyEvent, focus: Focus) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Esc => Some(UiEvent::Back),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Tab => Some(UiEvent::NextFocus),
        KeyCode::BackTab => Some(UiEvent::PrevFocus),
        KeyCode::Char('j') => Some(UiEvent::NextRecord),
        KeyCode::Char('k') => Some(UiEvent::PrevRecord),
        KeyCode::Char('a') => Some(UiEvent::AddRecord),
        KeyCode::Char('d') => Some(UiEvent::RequestDelete),
        KeyCode::Char('s') => Some(UiEvent::Send),
        KeyCode::Char('w') => Some(UiEvent::Save),
        KeyCode::Char('m') => Some(UiEvent::CycleMethod),
        KeyCode::Char('x') if focus == Focus::Headers => Some(UiEvent::DeleteHeader),
        KeyCode::Char('n') if focus == Focus::Headers => Some(UiEvent::StartHeaderInput),
        KeyCode::Char('e') | KeyCode::Enter => match focus {
            Focus::Name | Focus::Url | Focus::Body => Some(UiEvent::StartEditing),
            Focus::Method => Some(UiEvent::CycleMethod),
            Focus::Headers => Some(UiEvent::StartHeaderInput),
            Focus::Response => None,
        },
        KeyCode::Up => match focus {
            Focus::Headers => Some(UiEvent::PrevHeader),
            Focus::Response => Some(UiEvent::ScrollUp),
            _ => Some(UiEvent::PrevRecord),
        },
        KeyCode::Down => match focus {
            Focus::Headers => Some(UiEvent::NextHeader),
            Focus::Response => Some(UiEvent::ScrollDown),
            _ => Some(UiEvent::NextRecord),
        },
        _ => None,
    }
}

fn handle_editing_keys(key: KeyEvent, target: Option<EditTarget>) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Enter => match target {
            Some(EditTarget::Field(Field::Body)) => Some(UiEvent::Newline),
            _ => Some(UiEvent::StopEditing),
        },
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session_ctx() -> KeyContext {
        KeyContext {
            screen: Screen::Session,
            ..Default::default()
        }
    }

    #[test]
    fn test_modal_keys() {
        let ctx = KeyContext {
            modal: Modal::ConfirmDelete(0),
            ..session_ctx()
        };
        assert_eq!(key_to_ui_event(press(KeyCode::Char('y')), ctx), Some(UiEvent::Confirm));
        assert_eq!(key_to_ui_event(press(KeyCode::Esc), ctx), Some(UiEvent::Deny));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('a')), ctx), None);
    }

    #[test]
    fn test_focus_dependent_arrows() {
        let ctx = KeyContext {
            focus: Focus::Headers,
            ..session_ctx()
        };
        assert_eq!(key_to_ui_event(press(KeyCode::Down), ctx), Some(UiEvent::NextHeader));
        assert_eq!(
            key_to_ui_event(press(KeyCode::Down), session_ctx()),
            Some(UiEvent::NextRecord)
        );
    }

    #[test]
    fn test_enter_in_body_inserts_newline() {
        let ctx = KeyContext {
            input_mode: InputMode::Editing,
            edit_target: Some(EditTarget::Field(Field::Body)),
            ..session_ctx()
        };
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::Newline));

        let ctx = KeyContext {
            edit_target: Some(EditTarget::Field(Field::Url)),
            ..ctx
        };
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::StopEditing));
    }

    #[test]
    fn test_ctrl_s_saves_even_while_editing() {
        let ctx = KeyContext {
            input_mode: InputMode::Editing,
            ..session_ctx()
        };
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_to_ui_event(key, ctx), Some(UiEvent::Save));
    }

    #[test]
    fn test_prompt_typing() {
        let ctx = KeyContext::default();
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('q')), ctx),
            Some(UiEvent::CharInput('q'))
        );
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::SubmitPrompt));
    }
}
