//! App state - pure data structure with no I/O logic

use crate::app::input::TextInput;
use crate::messages::ui_events::{EditTarget, Focus, InputMode, Modal, Screen};
use crate::messages::RenderState;
use crate::session::SessionController;

/// A short message shown in the status bar
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub text: String,
    pub is_error: bool,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Notification {
            text: text.into(),
            is_error: false,
            at: chrono::Utc::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notification {
            text: text.into(),
            is_error: true,
            at: chrono::Utc::now(),
        }
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Open session, if any
    pub session: Option<SessionController>,

    // Selection
    pub selected: usize,
    pub focus: Focus,
    pub selected_header: usize,
    pub response_scroll: u16,

    // Text input
    pub input_mode: InputMode,
    pub edit_target: Option<EditTarget>,
    pub input: TextInput,

    // Popups
    pub modal: Modal,
    pub show_help: bool,

    // Feedback
    pub prompt_error: Option<String>,
    pub notification: Option<Notification>,

    pub should_quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppState {
    pub fn new(session: Option<SessionController>) -> Self {
        let mut state = AppState {
            session: None,
            selected: 0,
            focus: Focus::default(),
            selected_header: 0,
            response_scroll: 0,
            input_mode: InputMode::Normal,
            edit_target: None,
            input: TextInput::default(),
            modal: Modal::None,
            show_help: false,
            prompt_error: None,
            notification: None,
            should_quit: false,
        };
        match session {
            Some(controller) => state.enter_session(controller),
            None => state.enter_prompt(),
        }
        state
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_some() {
            Screen::Session
        } else {
            Screen::Prompt
        }
    }

    /// Switch to an opened session with fresh selection state
    pub fn enter_session(&mut self, controller: SessionController) {
        self.session = Some(controller);
        self.selected = 0;
        self.focus = Focus::default();
        self.selected_header = 0;
        self.response_scroll = 0;
        self.input_mode = InputMode::Normal;
        self.edit_target = None;
        self.input.clear();
        self.modal = Modal::None;
        self.prompt_error = None;
    }

    /// Drop the session (unsaved changes are discarded) and show the prompt
    pub fn enter_prompt(&mut self) {
        self.session = None;
        self.modal = Modal::None;
        self.input_mode = InputMode::Editing;
        self.edit_target = Some(EditTarget::Prompt);
        self.input.clear();
        self.prompt_error = None;
    }

    pub fn record_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.document().len())
    }

    /// Number of headers on the selected record
    pub fn header_count(&self) -> usize {
        self.session
            .as_ref()
            .and_then(|s| s.document().records().get(self.selected))
            .map_or(0, |r| r.definition.headers.len())
    }

    /// Keep selections inside the current bounds after records change
    pub fn clamp_selection(&mut self) {
        let count = self.record_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
        let headers = self.header_count();
        if self.selected_header >= headers {
            self.selected_header = headers.saturating_sub(1);
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let (session_path, dirty, records) = match &self.session {
            Some(s) => (
                Some(s.document().path().display().to_string()),
                s.is_dirty(),
                s.document().records().to_vec(),
            ),
            None => (None, false, Vec::new()),
        };

        RenderState {
            screen: self.screen(),
            session_path,
            dirty,
            records,
            selected: self.selected,
            focus: self.focus,
            selected_header: self.selected_header,
            response_scroll: self.response_scroll,
            input_mode: self.input_mode,
            edit_target: self.edit_target,
            input: self.input.clone(),
            modal: self.modal,
            show_help: self.show_help,
            prompt_error: self.prompt_error.clone(),
            notification: self.notification.clone(),
            should_quit: self.should_quit,
        }
    }
}
