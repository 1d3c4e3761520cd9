//! Session Controller - turns user intent into document operations

use std::sync::atomic::{AtomicU64, Ordering};

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::Field;
use crate::network::client::validate_url;
use crate::session::document::SessionDocument;

/// Everything a user can ask of an open session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    FieldChanged {
        index: usize,
        field: Field,
        value: String,
    },
    SetHeader {
        index: usize,
        key: String,
        value: String,
    },
    DeleteHeader {
        index: usize,
        key: String,
    },
    Add,
    /// Only sent after the user confirmed the deletion
    DeleteConfirmed(usize),
    Send(usize),
    Save,
    ExitRequested,
    /// Close even though there are unsaved changes
    ExitConfirmed,
}

/// What happened in response to a command, for the UI to act on
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The document changed and is now dirty
    Changed,
    /// A record was appended at this index
    Added(usize),
    /// The request must be handed to the network layer
    Dispatched(NetworkCommand),
    /// Nothing to persist or send (e.g. inline send error recorded)
    Unchanged,
    Saved,
    /// Unsaved changes; ask the user before closing
    ConfirmExit,
    /// The session may close now
    Close,
    /// The operation was refused; the message is meant for the user
    Failed(String),
}

/// Mediates between UI events and the active Session Document
pub struct SessionController {
    document: SessionDocument,
}

/// Dispatch ids are process-wide so a late completion from a closed
/// session can never match a send of the session opened after it.
static NEXT_DISPATCH_ID: AtomicU64 = AtomicU64::new(1);

impl SessionController {
    pub fn new(document: SessionDocument) -> Self {
        SessionController { document }
    }

    pub fn document(&self) -> &SessionDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn handle(&mut self, command: SessionCommand) -> Outcome {
        match command {
            SessionCommand::FieldChanged { index, field, value } => {
                self.on_field_changed(index, field, &value)
            }
            SessionCommand::SetHeader { index, key, value } => {
                self.on_set_header(index, &key, &value)
            }
            SessionCommand::DeleteHeader { index, key } => self.on_delete_header(index, &key),
            SessionCommand::Add => self.on_add(),
            SessionCommand::DeleteConfirmed(index) => self.on_delete_confirmed(index),
            SessionCommand::Send(index) => self.on_send(index),
            SessionCommand::Save => self.on_save(),
            SessionCommand::ExitRequested => self.on_exit_requested(),
            SessionCommand::ExitConfirmed => Outcome::Close,
        }
    }

    pub fn on_field_changed(&mut self, index: usize, field: Field, value: &str) -> Outcome {
        changed(self.document.set_field(index, field, value))
    }

    pub fn on_set_header(&mut self, index: usize, key: &str, value: &str) -> Outcome {
        changed(self.document.set_header(index, key, value))
    }

    pub fn on_delete_header(&mut self, index: usize, key: &str) -> Outcome {
        changed(self.document.delete_header(index, key))
    }

    pub fn on_add(&mut self) -> Outcome {
        Outcome::Added(self.document.add_record())
    }

    pub fn on_delete_confirmed(&mut self, index: usize) -> Outcome {
        changed(self.document.delete_record(index))
    }

    /// Hand the record at `index` to the network layer.
    ///
    /// An unusable URL is recorded inline right away and nothing is
    /// dispatched. Sending never marks the document dirty.
    pub fn on_send(&mut self, index: usize) -> Outcome {
        let (record_id, request) = match self.document.record(index) {
            Ok(record) => (record.id, record.definition.clone()),
            Err(e) => return failed(e),
        };

        if let Err(e) = validate_url(&request.url) {
            tracing::info!(index, error = %e, "Send refused");
            if let Some(record) = self.document.transient_mut(record_id) {
                record.last_error = Some(e.to_string());
            }
            return Outcome::Unchanged;
        }

        let id = NEXT_DISPATCH_ID.fetch_add(1, Ordering::Relaxed);
        if let Some(record) = self.document.transient_mut(record_id) {
            record.pending = Some(id);
            record.last_error = None;
        }
        tracing::info!(id, index, url = %request.url, "Dispatching request");

        Outcome::Dispatched(NetworkCommand::ExecuteRequest {
            id,
            record: record_id,
            request,
        })
    }

    /// Store a finished send on the record it came from.
    ///
    /// Results apply in completion order, so the last one to finish wins.
    /// Returns the record's current index, or `None` if it was deleted
    /// meanwhile.
    pub fn on_response(&mut self, response: NetworkResponse) -> Option<usize> {
        let NetworkResponse::Completed { id, record, result } = response;

        let Some(index) = self.document.position(record) else {
            tracing::debug!(id, "Dropping response for deleted record");
            return None;
        };
        let target = self.document.transient_mut(record)?;
        if target.pending == Some(id) {
            target.pending = None;
        }
        match result {
            Ok(resp) => {
                target.last_response = Some(resp);
                target.last_error = None;
            }
            // A failed send keeps whatever response came before it
            Err(e) => target.last_error = Some(e.to_string()),
        }
        Some(index)
    }

    pub fn on_save(&mut self) -> Outcome {
        match self.document.save() {
            Ok(()) => Outcome::Saved,
            Err(e) => failed(e),
        }
    }

    pub fn on_exit_requested(&self) -> Outcome {
        if self.document.is_dirty() {
            Outcome::ConfirmExit
        } else {
            Outcome::Close
        }
    }
}

fn changed<T>(result: Result<T, crate::error::SessionError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Changed,
        Err(e) => failed(e),
    }
}

fn failed(err: impl std::fmt::Display) -> Outcome {
    tracing::warn!(error = %err, "Session operation refused");
    Outcome::Failed(err.to_string())
}
