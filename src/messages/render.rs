//! Render state - data structure sent from App layer to UI for rendering

use crate::app::input::TextInput;
use crate::app::state::Notification;
use crate::messages::ui_events::{EditTarget, Focus, InputMode, KeyContext, Modal, Screen};
use crate::models::RequestRecord;

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub screen: Screen,

    // Session
    pub session_path: Option<String>,
    pub dirty: bool,
    pub records: Vec<RequestRecord>,

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

    /// The UI loop exits once this is set
    pub should_quit: bool,
}

impl RenderState {
    pub fn selected_record(&self) -> Option<&RequestRecord> {
        self.records.get(self.selected)
    }

    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            screen: self.screen,
            modal: self.modal,
            show_help: self.show_help,
            input_mode: self.input_mode,
            focus: self.focus,
            edit_target: self.edit_target,
        }
    }

    /// True when the given target is being edited right now
    pub fn is_editing(&self, target: EditTarget) -> bool {
        self.input_mode == InputMode::Editing && self.edit_target == Some(target)
    }
}
