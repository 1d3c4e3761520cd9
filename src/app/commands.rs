//! Command handlers - turn UI events into session commands and UI state

use crate::app::state::Notification;
use crate::app::AppState;
use crate::app::input::TextInput;
use crate::messages::ui_events::{EditTarget, ExitAction, Focus, InputMode, Modal, Screen};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::Field;
use crate::session::{Outcome, SessionCommand, SessionController, SessionDocument};
use crate::validators::validate_session_path;

impl AppState {
    // ========================
    // Session commands
    // ========================

    /// Run a command against the open session and react to its outcome.
    /// Returns a network command when the outcome is a dispatch.
    pub fn apply(&mut self, command: SessionCommand) -> Option<NetworkCommand> {
        let outcome = self.session.as_mut()?.handle(command);
        self.apply_outcome(outcome)
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> Option<NetworkCommand> {
        match outcome {
            Outcome::Changed | Outcome::Unchanged => self.clamp_selection(),
            Outcome::Added(index) => {
                self.selected = index;
                self.selected_header = 0;
                self.response_scroll = 0;
            }
            Outcome::Dispatched(cmd) => return Some(cmd),
            Outcome::Saved => self.notification = Some(Notification::info("Saved")),
            Outcome::ConfirmExit | Outcome::Close => {}
            Outcome::Failed(message) => self.notification = Some(Notification::error(message)),
        }
        None
    }

    // ========================
    // Navigation
    // ========================

    pub fn next_record(&mut self) {
        let count = self.record_count();
        if count > 0 {
            self.select_record((self.selected + 1) % count);
        }
    }

    pub fn prev_record(&mut self) {
        let count = self.record_count();
        if count > 0 {
            self.select_record(self.selected.checked_sub(1).unwrap_or(count - 1));
        }
    }

    fn select_record(&mut self, index: usize) {
        if index != self.selected {
            self.selected = index;
            self.selected_header = 0;
            self.response_scroll = 0;
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn next_header(&mut self) {
        let count = self.header_count();
        if count > 0 {
            self.selected_header = (self.selected_header + 1) % count;
        }
    }

    pub fn prev_header(&mut self) {
        let count = self.header_count();
        if count > 0 {
            self.selected_header = self.selected_header.checked_sub(1).unwrap_or(count - 1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    // ========================
    // Input editing
    // ========================

    /// Begin editing the focused text field of the selected record
    pub fn start_editing(&mut self) {
        let Some(field) = self.focus.field() else {
            return;
        };
        let Some(current) = self.selected_definition_value(field) else {
            return;
        };
        self.input = TextInput::with_text(&current);
        self.edit_target = Some(EditTarget::Field(field));
        self.input_mode = InputMode::Editing;
    }

    pub fn start_header_input(&mut self) {
        if self.record_count() == 0 {
            return;
        }
        self.input.clear();
        self.edit_target = Some(EditTarget::NewHeader);
        self.input_mode = InputMode::Editing;
    }

    /// Leave editing mode, committing the buffer to the document
    pub fn stop_editing(&mut self) {
        // The prompt never leaves editing mode
        if self.input_mode != InputMode::Editing || self.edit_target == Some(EditTarget::Prompt) {
            return;
        }
        let target = self.edit_target.take();
        let text = self.input.take();
        self.input_mode = InputMode::Normal;

        match target {
            Some(EditTarget::Field(field)) => {
                if self.selected_definition_value(field).as_deref() != Some(text.as_str()) {
                    self.apply(SessionCommand::FieldChanged {
                        index: self.selected,
                        field,
                        value: text,
                    });
                }
            }
            Some(EditTarget::NewHeader) => {
                if !text.trim().is_empty() {
                    let (key, value) = text.split_once(':').unwrap_or((text.as_str(), ""));
                    self.apply(SessionCommand::SetHeader {
                        index: self.selected,
                        key: key.trim().to_string(),
                        value: value.trim().to_string(),
                    });
                }
            }
            Some(EditTarget::Prompt) | None => {}
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if self.input_mode == InputMode::Editing {
            self.input.insert(c);
        }
    }

    pub fn newline(&mut self) {
        self.enter_char('\n');
    }

    pub fn delete_char(&mut self) {
        self.input.backspace();
    }

    pub fn move_cursor_left(&mut self) {
        self.input.move_left();
    }

    pub fn move_cursor_right(&mut self) {
        self.input.move_right();
    }

    fn selected_definition_value(&self, field: Field) -> Option<String> {
        let record = self.session.as_ref()?.document().records().get(self.selected)?;
        let def = &record.definition;
        Some(match field {
            Field::Name => def.name.clone(),
            Field::Method => def.method.as_str().to_string(),
            Field::Url => def.url.clone(),
            Field::Body => def.body.clone(),
        })
    }

    // ========================
    // Record actions
    // ========================

    pub fn add_record(&mut self) {
        self.apply(SessionCommand::Add);
        self.focus = Focus::Name;
    }

    /// Ask for confirmation before deleting the selected record
    pub fn request_delete(&mut self) {
        if self.selected < self.record_count() {
            self.modal = Modal::ConfirmDelete(self.selected);
        }
    }

    pub fn cycle_method(&mut self) {
        let current = self
            .session
            .as_ref()
            .and_then(|s| s.document().records().get(self.selected))
            .map(|r| r.definition.method);
        if let Some(method) = current {
            self.apply(SessionCommand::FieldChanged {
                index: self.selected,
                field: Field::Method,
                value: method.next().as_str().to_string(),
            });
        }
    }

    pub fn delete_header(&mut self) {
        let key = self
            .session
            .as_ref()
            .and_then(|s| s.document().records().get(self.selected))
            .and_then(|r| r.definition.headers.keys().nth(self.selected_header))
            .map(str::to_string);
        if let Some(key) = key {
            self.apply(SessionCommand::DeleteHeader {
                index: self.selected,
                key,
            });
        }
    }

    pub fn send(&mut self) -> Option<NetworkCommand> {
        if self.record_count() == 0 {
            return None;
        }
        self.response_scroll = 0;
        self.apply(SessionCommand::Send(self.selected))
    }

    pub fn save(&mut self) {
        self.stop_editing();
        self.apply(SessionCommand::Save);
    }

    // ========================
    // Responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        if let Some(session) = self.session.as_mut() {
            if session.on_response(response) == Some(self.selected) {
                self.response_scroll = 0;
            }
        }
    }

    // ========================
    // Modals
    // ========================

    pub fn confirm(&mut self) {
        match std::mem::take(&mut self.modal) {
            Modal::ConfirmDelete(index) => {
                self.apply(SessionCommand::DeleteConfirmed(index));
                self.clamp_selection();
            }
            Modal::ConfirmExit(action) => {
                if let Some(session) = self.session.as_mut() {
                    if let Outcome::Close = session.handle(SessionCommand::ExitConfirmed) {
                        self.perform_exit(action);
                    }
                }
            }
            Modal::None => {}
        }
    }

    pub fn deny(&mut self) {
        self.modal = Modal::None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ========================
    // Prompt
    // ========================

    /// Validate the typed path and open (or create) that session
    pub fn submit_prompt(&mut self) {
        let path = match validate_session_path(self.input.buffer.trim()) {
            Ok(path) => path,
            Err(reason) => {
                self.prompt_error = Some(reason);
                return;
            }
        };
        match SessionDocument::open(&path) {
            Ok(document) => self.enter_session(SessionController::new(document)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not open session");
                self.prompt_error = Some(e.to_string());
            }
        }
    }

    // ========================
    // Exit
    // ========================

    pub fn request_exit(&mut self, action: ExitAction) {
        if self.screen() == Screen::Prompt {
            if action == ExitAction::Quit {
                self.should_quit = true;
            }
            return;
        }

        self.stop_editing();
        let outcome = match self.session.as_ref() {
            Some(session) => session.on_exit_requested(),
            None => Outcome::Close,
        };
        match outcome {
            Outcome::ConfirmExit => self.modal = Modal::ConfirmExit(action),
            _ => self.perform_exit(action),
        }
    }

    fn perform_exit(&mut self, action: ExitAction) {
        match action {
            ExitAction::Back => self.enter_prompt(),
            ExitAction::Quit => self.should_quit = true,
        }
    }
}
