//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::ui_events::ExitAction;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    self.handle_ui_event(event);
                    let _ = self.render_tx.send(self.state.to_render_state());
                    if self.state.should_quit {
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }

        tracing::debug!("App actor stopped");
    }

    fn dispatch(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    fn handle_ui_event(&mut self, event: UiEvent) {
        match event {
            // Navigation
            UiEvent::NextRecord => self.state.next_record(),
            UiEvent::PrevRecord => self.state.prev_record(),
            UiEvent::NextFocus => self.state.next_focus(),
            UiEvent::PrevFocus => self.state.prev_focus(),
            UiEvent::NextHeader => self.state.next_header(),
            UiEvent::PrevHeader => self.state.prev_header(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Newline => self.state.newline(),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),

            // Record actions
            UiEvent::AddRecord => self.state.add_record(),
            UiEvent::RequestDelete => self.state.request_delete(),
            UiEvent::CycleMethod => self.state.cycle_method(),
            UiEvent::Send => {
                let cmd = self.state.send();
                self.dispatch(cmd);
            }
            UiEvent::Save => self.state.save(),

            // Headers
            UiEvent::StartHeaderInput => self.state.start_header_input(),
            UiEvent::DeleteHeader => self.state.delete_header(),

            // Popups
            UiEvent::Confirm => self.state.confirm(),
            UiEvent::Deny => self.state.deny(),
            UiEvent::ToggleHelp => self.state.toggle_help(),

            UiEvent::SubmitPrompt => self.state.submit_prompt(),

            // System
            UiEvent::Back => self.state.request_exit(ExitAction::Back),
            UiEvent::Quit => self.state.request_exit(ExitAction::Quit),
        }
    }
}
