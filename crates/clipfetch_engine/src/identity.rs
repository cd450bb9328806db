//! Durable client identity.
//!
//! The session id correlates this client with its private progress topic on
//! the server. It is created once, persisted, and never regenerated while a
//! stored value exists.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use clipfetch_logging::{clip_info, clip_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{AtomicFileWriter, PersistError};

const SESSION_FILENAME: &str = "session.ron";

/// Opaque client correlation id. Not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random (version 4) id in the hyphenated 8-4-4-4-12 form.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("stored session id in {0:?} is empty")]
    Empty(PathBuf),
    #[error("failed to serialize session: {0}")]
    Serialize(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    session_id: SessionId,
}

/// Stores the session id as RON under a state directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    /// Returns the persisted id, creating and storing one on first use.
    ///
    /// A stored file that cannot be read is left untouched and an ephemeral
    /// id is used for this process instead.
    pub fn get_or_create(&self) -> SessionId {
        match self.load() {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = SessionId::generate();
                match self.save(&id) {
                    Ok(()) => clip_info!("Created session id {} at {:?}", id, self.path()),
                    Err(err) => clip_warn!("Session id {} not persisted: {}", id, err),
                }
                id
            }
            Err(err) => {
                clip_warn!("Using an ephemeral session id; stored one is unusable: {}", err);
                SessionId::generate()
            }
        }
    }

    pub fn load(&self) -> Result<Option<SessionId>, IdentityError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(IdentityError::Read { path, source }),
        };

        let persisted: PersistedSession =
            ron::from_str(&content).map_err(|err| IdentityError::Parse {
                path: path.clone(),
                message: err.to_string(),
            })?;
        if persisted.session_id.as_str().trim().is_empty() {
            return Err(IdentityError::Empty(path));
        }
        Ok(Some(persisted.session_id))
    }

    fn save(&self, id: &SessionId) -> Result<(), IdentityError> {
        let persisted = PersistedSession {
            session_id: id.clone(),
        };
        let content = ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::new())
            .map_err(|err| IdentityError::Serialize(err.to_string()))?;
        AtomicFileWriter::new(self.dir.clone()).write(SESSION_FILENAME, content.as_bytes())?;
        Ok(())
    }
}
