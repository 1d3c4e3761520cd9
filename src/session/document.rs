//! Session Document - the ordered request records of one session file
//!
//! Every mutating operation either fully applies and marks the document
//! dirty, or returns an error and leaves the records untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::EMPTY_SESSION;
use crate::error::SessionError;
use crate::models::{Field, RecordId, RequestDefinition, RequestRecord};

pub type Result<T> = std::result::Result<T, SessionError>;

/// One open session file and its in-memory records
#[derive(Debug)]
pub struct SessionDocument {
    path: PathBuf,
    records: Vec<RequestRecord>,
    dirty: bool,
}

impl SessionDocument {
    /// Open a session file, creating it as `[]` if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let exists = path
            .try_exists()
            .map_err(|e| SessionError::io(&path, &e))?;
        if !exists {
            tracing::info!(path = %path.display(), "Creating new session file");
            fs::write(&path, EMPTY_SESSION).map_err(|e| SessionError::io(&path, &e))?;
        }

        let content = fs::read_to_string(&path).map_err(|e| SessionError::io(&path, &e))?;
        let definitions = parse_definitions(&path, &content)?;

        let document = SessionDocument {
            path,
            records: definitions
                .into_iter()
                .map(|definition| RequestRecord::new(RecordId::next(), definition))
                .collect(),
            dirty: false,
        };

        tracing::info!(
            path = %document.path.display(),
            records = document.records.len(),
            "Opened session"
        );
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when records changed since the last open or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn record(&self, index: usize) -> Result<&RequestRecord> {
        let len = self.records.len();
        self.records
            .get(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })
    }

    /// Current position of the record with this id, if it still exists
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Access to a record's transient send state. Changes made through this
    /// never touch the dirty flag.
    pub fn transient_mut(&mut self, id: RecordId) -> Option<&mut RequestRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Append a record with every field at its default. Returns its index.
    pub fn add_record(&mut self) -> usize {
        let id = RecordId::next();
        self.records
            .push(RequestRecord::new(id, RequestDefinition::default()));
        self.dirty = true;
        tracing::debug!(index = self.records.len() - 1, "Added record");
        self.records.len() - 1
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete_record(&mut self, index: usize) -> Result<RequestRecord> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        self.dirty = true;
        tracing::debug!(index, name = %removed.definition.name, "Deleted record");
        Ok(removed)
    }

    /// Set a scalar field by name (`name`, `method`, `url`, `body`).
    pub fn update_field(&mut self, index: usize, field: &str, value: &str) -> Result<()> {
        let field: Field = field.parse()?;
        self.set_field(index, field, value)
    }

    pub fn set_field(&mut self, index: usize, field: Field, value: &str) -> Result<()> {
        self.check_index(index)?;

        let record = &mut self.records[index];
        let definition = &mut record.definition;
        match field {
            Field::Name => definition.name = value.to_string(),
            Field::Method => definition.method = value.parse()?,
            Field::Url => definition.url = value.to_string(),
            Field::Body => definition.body = value.to_string(),
        }
        if field.shapes_request() {
            clear_send_result(record);
        }
        self.dirty = true;
        tracing::debug!(index, field = field.as_str(), "Updated field");
        Ok(())
    }

    pub fn set_header(&mut self, index: usize, key: &str, value: &str) -> Result<()> {
        self.check_index(index)?;
        if key.is_empty() {
            return Err(SessionError::InvalidHeader("header name is empty".into()));
        }
        if value.is_empty() {
            return Err(SessionError::InvalidHeader(format!(
                "value for {} is empty",
                key
            )));
        }

        let record = &mut self.records[index];
        record.definition.headers.set(key, value);
        clear_send_result(record);
        self.dirty = true;
        tracing::debug!(index, key, "Set header");
        Ok(())
    }

    /// Remove a header by exact key. Returns the removed value.
    pub fn delete_header(&mut self, index: usize, key: &str) -> Result<String> {
        self.check_index(index)?;
        let record = &mut self.records[index];
        let removed = record
            .definition
            .headers
            .remove(key)
            .ok_or_else(|| SessionError::InvalidHeader(format!("no header named {}", key)))?;
        clear_send_result(record);
        self.dirty = true;
        tracing::debug!(index, key, "Deleted header");
        Ok(removed)
    }

    /// Project the records into their persisted shape, in order.
    pub fn compile(&self) -> Vec<RequestDefinition> {
        self.records.iter().map(|r| r.definition.clone()).collect()
    }

    /// The exact text `save` writes
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(&self.compile()).map_err(|e| SessionError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write the compiled records to the backing file.
    ///
    /// The content goes to a temporary file next to the target which then
    /// replaces it, so a failed save leaves the previous file intact.
    pub fn save(&mut self) -> Result<()> {
        let json = self.to_json()?;
        write_atomically(&self.path, json.as_bytes()).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Save failed");
            SessionError::io(&self.path, &e)
        })?;
        self.dirty = false;
        tracing::info!(
            path = %self.path.display(),
            records = self.records.len(),
            "Saved session"
        );
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        self.record(index).map(|_| ())
    }
}

fn clear_send_result(record: &mut RequestRecord) {
    record.last_response = None;
    record.last_error = None;
}

fn parse_definitions(path: &Path, content: &str) -> Result<Vec<RequestDefinition>> {
    let malformed = |reason: String| SessionError::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        _ => return Err(malformed("top-level value must be an array".into())),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            if !entry.is_object() {
                return Err(malformed(format!("entry {} is not an object", i)));
            }
            serde_json::from_value(entry).map_err(|e| malformed(format!("entry {}: {}", i, e)))
        })
        .collect()
}

/// Pretty JSON with 4-space indentation
fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
