use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::crypto::{DeviceKey, Passphrase};

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has expired")]
    Expired,
    #[error("session was invalidated")]
    Invalidated,
}

/// Where a session's key material came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Typed by the user
    Passphrase,
    /// Released from the local device key store
    DeviceKey,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Passphrase => f.write_str("passphrase"),
            KeySource::DeviceKey => f.write_str("device key"),
        }
    }
}

/// Unlocked key material for one stretch of use
///
/// A session holds the passphrase until it is invalidated or its ttl runs
///  out. Nothing is shared between sessions.
pub struct Session {
    id: Uuid,
    source: KeySource,
    passphrase: Option<Passphrase>,
    started: Instant,
    ttl: Option<Duration>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("active", &self.passphrase.is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Session {
    pub fn from_passphrase(passphrase: Passphrase, ttl: Option<Duration>) -> Self {
        Self::new(KeySource::Passphrase, passphrase, ttl)
    }

    pub fn from_device_key(key: &DeviceKey, ttl: Option<Duration>) -> Self {
        Self::new(KeySource::DeviceKey, key.passphrase(), ttl)
    }

    fn new(source: KeySource, passphrase: Passphrase, ttl: Option<Duration>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            source,
            passphrase: Some(passphrase),
            started: Instant::now(),
            ttl,
        };
        tracing::debug!(session = %session.id, %source, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn is_expired(&self) -> bool {
        self.ttl
            .map(|ttl| self.started.elapsed() >= ttl)
            .unwrap_or(false)
    }

    pub fn is_active(&self) -> bool {
        self.passphrase.is_some() && !self.is_expired()
    }

    /// The session's passphrase, if it is still usable
    pub fn passphrase(&self) -> Result<&Passphrase, SessionError> {
        let passphrase = self.passphrase.as_ref().ok_or(SessionError::Invalidated)?;
        if self.is_expired() {
            return Err(SessionError::Expired);
        }
        Ok(passphrase)
    }

    /// Drop the key material; later use fails with `Invalidated`
    pub fn invalidate(&mut self) {
        if self.passphrase.take().is_some() {
            tracing::debug!(session = %self.id, "session invalidated");
        }
    }
}
