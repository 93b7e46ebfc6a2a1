//! Data file editing: search, add, set and remove host records by name
//!
//! [`DataEditor`] owns the record list of one data file. Host lookup is by
//! the string `name` key; the first matching record wins.
//!
//! `set` paths use the same segment syntax as condition keys
//! (`vcenter.nics[0].mac`). Missing intermediate mappings are created, but a
//! list element is never created: an indexed segment must address an
//! existing element.

use crate::path::Segment;
use crate::{KeyPath, Map, Value};
use tracing::{debug, info, warn};

/// Errors from [`DataEditor`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("no such host was found: {0}")]
    HostNotFound(String),

    #[error("cannot parse value as YAML: {0}")]
    InvalidValue(#[source] serde_yaml::Error),

    #[error("value of '{segment}' is not a list or mapping")]
    NotContainer { segment: String },

    #[error("key '{segment}' is not a list")]
    NotAList { segment: String },

    #[error("key index '{segment}' is out of range (length {len})")]
    IndexOutOfRange { segment: String, len: usize },

    #[error("cannot create non-existing indexed value '{segment}'")]
    CannotCreateIndexed { segment: String },
}

impl EditError {
    /// Process exit status for this error: 127 when the addressed host or
    /// element does not exist, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HostNotFound(_)
            | Self::NotAList { .. }
            | Self::IndexOutOfRange { .. }
            | Self::CannotCreateIndexed { .. } => 127,
            Self::InvalidValue(_) | Self::NotContainer { .. } => 1,
        }
    }
}

/// Parse a command-line value as YAML. Empty text is null.
///
/// # Errors
///
/// [`EditError::InvalidValue`] if the text is not valid YAML.
pub fn parse_value(text: &str) -> Result<Value, EditError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(EditError::InvalidValue)
}

/// Parameters of [`DataEditor::add`].
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub name: String,
    /// Empty strings count as absent.
    pub ip: Option<String>,
    /// Comma-separated list of groups. Empty strings count as absent.
    pub groups: Option<String>,
    pub override_ungrouped: bool,
}

impl AddRequest {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: None,
            groups: None,
            override_ungrouped: true,
        }
    }

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref().filter(|ip| !ip.is_empty())
    }

    /// One group is stored as a string, several as a list.
    fn group_value(&self) -> Option<Value> {
        let groups = self.groups.as_deref().filter(|g| !g.is_empty())?;
        let mut parts: Vec<Value> = groups.split(',').map(Value::from).collect();
        if parts.len() == 1 {
            parts.pop()
        } else {
            Some(Value::List(parts))
        }
    }
}

/// Result of [`DataEditor::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    Updated,
    /// The host exists and already had the requested data.
    Unchanged,
}

/// Result of [`DataEditor::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Set,
    Removed,
    /// A null value was given for a key that does not exist.
    NothingToRemove,
}

/// Edits the record list of one data file.
#[derive(Debug, Clone, Default)]
pub struct DataEditor {
    records: Vec<Value>,
}

impl DataEditor {
    #[must_use]
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        self.records
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.get("name").and_then(Value::as_str) == Some(name))
    }

    /// The first record named `name`.
    #[must_use]
    pub fn search(&self, name: &str) -> Option<&Value> {
        debug!(host = name, "searching for host");
        self.position(name).map(|i| &self.records[i])
    }

    /// Add a host, or update the ip, groups and `override_ungrouped` flag of
    /// an existing one.
    pub fn add(&mut self, request: &AddRequest) -> AddOutcome {
        debug!(host = %request.name, "adding host");
        match self.position(&request.name) {
            Some(i) => {
                warn!(host = %request.name, "host already exists");
                match self.records[i].as_map_mut() {
                    Some(record) => update(record, request),
                    None => AddOutcome::Unchanged,
                }
            }
            None => {
                self.records.push(Value::Map(create(request)));
                info!(host = %request.name, "host added");
                AddOutcome::Created
            }
        }
    }

    /// Set the value at `path` in host `name`. A null value removes the key
    /// or list element.
    ///
    /// # Errors
    ///
    /// See [`EditError`]; the record is left unchanged on error, except for
    /// intermediate mappings already created along the path.
    pub fn set(
        &mut self,
        name: &str,
        path: &KeyPath,
        value: Value,
    ) -> Result<SetOutcome, EditError> {
        debug!(host = name, path = %path, "setting property");
        let i = self
            .position(name)
            .ok_or_else(|| EditError::HostNotFound(name.to_string()))?;
        let Some(mut current) = self.records[i].as_map_mut() else {
            return Err(EditError::HostNotFound(name.to_string()));
        };

        let Some((last, parents)) = path.segments().split_last() else {
            return Err(EditError::NotContainer {
                segment: path.to_string(),
            });
        };
        for segment in parents {
            current = descend(current, segment)?;
        }
        let outcome = assign(current, last, value)?;
        info!(host = name, path = %path, ?outcome, "property updated");
        Ok(outcome)
    }

    /// Remove the first record named `name`. Returns `false` (with a
    /// warning) if there is none.
    pub fn remove(&mut self, name: &str) -> bool {
        debug!(host = name, "removing host");
        match self.position(name) {
            Some(i) => {
                self.records.remove(i);
                info!(host = name, "host removed");
                true
            }
            None => {
                warn!(host = name, "no such host was found");
                false
            }
        }
    }
}

fn create(request: &AddRequest) -> Map {
    let mut record = Map::new();
    record.insert("name".into(), Value::from(request.name.as_str()));
    if let Some(ip) = request.ip() {
        record.insert("ip".into(), Value::from(ip));
    }

    let mut ansible = Map::new();
    if let Some(groups) = request.group_value() {
        ansible.insert("group".into(), groups);
    }
    if request.override_ungrouped {
        ansible.insert("override_ungrouped".into(), Value::Bool(true));
    }
    if !ansible.is_empty() {
        record.insert("ansible".into(), Value::Map(ansible));
    }
    record
}

fn update(record: &mut Map, request: &AddRequest) -> AddOutcome {
    let mut changed = false;

    if let Some(ip) = request.ip() {
        match record.get("ip").and_then(Value::as_str) {
            Some(old) if old == ip => {}
            old => {
                info!(host = %request.name, old = ?old, new = ip, "updating ip");
                record.insert("ip".into(), Value::from(ip));
                changed = true;
            }
        }
    }

    if let Some(groups) = request.group_value() {
        if let Some(ansible) = ansible_mut(record) {
            if ansible.get("group") != Some(&groups) {
                info!(host = %request.name, "updating ansible.group");
                ansible.insert("group".into(), groups);
                changed = true;
            }
        }
    }

    if !request.override_ungrouped {
        let already_false = record
            .get("ansible")
            .and_then(|a| a.get("override_ungrouped"))
            .is_some_and(|v| !v.is_truthy_flag());
        if let Some(ansible) = ansible_mut(record).filter(|_| !already_false) {
            info!(host = %request.name, "setting ansible.override_ungrouped: false");
            ansible.insert("override_ungrouped".into(), Value::Bool(false));
            changed = true;
        }
    }

    if changed {
        AddOutcome::Updated
    } else {
        AddOutcome::Unchanged
    }
}

/// The record's `ansible` mapping, created (or replacing a non-mapping).
fn ansible_mut(record: &mut Map) -> Option<&mut Map> {
    let entry = record
        .entry("ansible".to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    if entry.as_map().is_none() {
        warn!(found = entry.type_name(), "replacing non-mapping ansible key");
        *entry = Value::Map(Map::new());
    }
    entry.as_map_mut()
}

fn descend<'m>(map: &'m mut Map, segment: &Segment) -> Result<&'m mut Map, EditError> {
    let not_container = || EditError::NotContainer {
        segment: segment.to_string(),
    };
    match segment.index() {
        None => {
            if !map.contains_key(segment.key()) {
                debug!(key = segment.key(), "creating mapping");
            }
            map.entry(segment.key().to_string())
                .or_insert_with(|| Value::Map(Map::new()))
                .as_map_mut()
                .ok_or_else(not_container)
        }
        Some(index) => {
            let list = indexed_list(map, segment)?;
            let len = list.len();
            list.get_mut(index)
                .ok_or_else(|| EditError::IndexOutOfRange {
                    segment: segment.to_string(),
                    len,
                })?
                .as_map_mut()
                .ok_or_else(not_container)
        }
    }
}

fn indexed_list<'m>(map: &'m mut Map, segment: &Segment) -> Result<&'m mut Vec<Value>, EditError> {
    match map.get_mut(segment.key()) {
        Some(Value::List(items)) => Ok(items),
        Some(_) => Err(EditError::NotAList {
            segment: segment.key().to_string(),
        }),
        None => Err(EditError::CannotCreateIndexed {
            segment: segment.to_string(),
        }),
    }
}

fn assign(map: &mut Map, segment: &Segment, value: Value) -> Result<SetOutcome, EditError> {
    let Some(index) = segment.index() else {
        if !value.is_null() {
            map.insert(segment.key().to_string(), value);
            return Ok(SetOutcome::Set);
        }
        if map.shift_remove(segment.key()).is_some() {
            return Ok(SetOutcome::Removed);
        }
        warn!(key = segment.key(), "cannot remove non-existing key");
        return Ok(SetOutcome::NothingToRemove);
    };

    let list = indexed_list(map, segment)?;
    if index >= list.len() {
        return Err(EditError::IndexOutOfRange {
            segment: segment.to_string(),
            len: list.len(),
        });
    }
    if value.is_null() {
        list.remove(index);
        Ok(SetOutcome::Removed)
    } else {
        list[index] = value;
        Ok(SetOutcome::Set)
    }
}
