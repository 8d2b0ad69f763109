//! Restore files.
//!
//! A restore file lists the sessions that were alive under a restore ID so a
//! restarted controller can pick them up again. Format:
//!
//! ```json
//! { "id": "abc123", "sessions": [{ "partition": "p1", "session": "<uuid>" }] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::types::{RestoreError, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreData {
    pub id: String,
    #[serde(default)]
    pub sessions: Vec<RestoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreEntry {
    pub partition: String,
    pub session: Uuid,
}

impl From<&Session> for RestoreEntry {
    fn from(session: &Session) -> Self {
        Self {
            partition: session.partition.clone(),
            session: session.session,
        }
    }
}

impl From<RestoreEntry> for Session {
    fn from(entry: RestoreEntry) -> Self {
        Self {
            partition: entry.partition,
            session: entry.session,
            resources: None,
        }
    }
}

/// Location of the restore file for one restore ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFile {
    id: String,
    path: PathBuf,
}

impl RestoreFile {
    pub fn new(dir: &Path, id: &str) -> Result<Self, RestoreError> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if !valid {
            return Err(RestoreError::InvalidId(id.to_string()));
        }

        Ok(Self {
            id: id.to_string(),
            path: dir.join(format!("{id}.json")),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. `Ok(None)` when it does not exist yet.
    pub fn read(&self) -> Result<Option<RestoreData>, RestoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RestoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| RestoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Overwrite the file with `sessions`, creating the directory if needed.
    ///
    /// The document goes to a sibling `.tmp` file first and is renamed into
    /// place, so readers never see a partial file.
    pub fn write(&self, sessions: &[Session]) -> Result<(), RestoreError> {
        let io_err = |source| RestoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let data = RestoreData {
            id: self.id.clone(),
            sessions: sessions.iter().map(RestoreEntry::from).collect(),
        };
        let json = serde_json::to_string_pretty(&data).map_err(|source| RestoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)
    }
}
