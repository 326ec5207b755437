//! Identity provider backed by the local `credentials` table.
//!
//! Passwords are never stored: each account keeps a random salt and a
//! PBKDF2-SHA256 hash, both base64-encoded, plus the iteration count used
//! so the work factor can be raised without invalidating old accounts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::keys::{generate_salt, PasswordHash, PBKDF2_ITERATIONS, SALT_LENGTH};
use super::{AuthError, IdentityProvider, ListenerId, Session, SessionListener};
use crate::db::Database;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub struct LocalIdentityProvider {
    db: Arc<Database>,
    iterations: u32,
    session: RwLock<Option<Session>>,
    listeners: Mutex<Vec<(ListenerId, SessionListener)>>,
    next_listener: AtomicU64,
}

impl LocalIdentityProvider {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_iterations(db, PBKDF2_ITERATIONS)
    }

    pub fn with_iterations(db: Arc<Database>, iterations: u32) -> Self {
        Self {
            db,
            iterations: iterations.max(1),
            session: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Replace the session and notify listeners outside any lock.
    fn set_session(&self, session: Option<Session>) -> Result<(), AuthError> {
        {
            let mut guard = self.session.write().map_err(|_| AuthError::LockPoisoned)?;
            *guard = session.clone();
        }

        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .map_err(|_| AuthError::LockPoisoned)?
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(session.as_ref());
        }
        Ok(())
    }
}

/// Trim and lowercase; reject anything without a local part and a domain.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn on_session_change(&self, listener: SessionListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::clone(&listener)));
        }
        let current = self.current_session();
        listener(current.as_ref());
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(lid, _)| *lid != id);
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let row: Option<(String, String, String, u32)> = {
            let conn = self.db.lock()?;
            conn.query_row(
                "SELECT uid, salt, password_hash, iterations FROM credentials WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?
        };

        let Some((uid, salt, stored_hash, iterations)) = row else {
            // Same work as a real check so unknown emails are not distinguishable by timing.
            let _ = PasswordHash::derive(password, &[0u8; SALT_LENGTH], self.iterations);
            tracing::warn!("Sign-in failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let salt = STANDARD
            .decode(salt)
            .map_err(|_| AuthError::CorruptCredentials(email.clone()))?;
        let stored_hash = STANDARD
            .decode(stored_hash)
            .map_err(|_| AuthError::CorruptCredentials(email.clone()))?;
        let doctor_id =
            Uuid::parse_str(&uid).map_err(|_| AuthError::CorruptCredentials(email.clone()))?;

        if !PasswordHash::derive(password, &salt, iterations).matches(&stored_hash) {
            tracing::warn!("Sign-in failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            doctor_id,
            email,
            signed_in_at: Utc::now(),
        };
        self.set_session(Some(session.clone()))?;
        tracing::info!(doctor_id = %session.doctor_id, "Doctor signed in");
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword { min: MIN_PASSWORD_LENGTH });
        }

        let salt = generate_salt();
        let hash = PasswordHash::derive(password, &salt, self.iterations);
        let doctor_id = Uuid::new_v4();
        let now = Utc::now();

        {
            let conn = self.db.lock()?;
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM credentials WHERE email = ?1)",
                params![email],
                |row| row.get(0),
            )?;
            if exists {
                return Err(AuthError::EmailInUse(email));
            }

            conn.execute(
                "INSERT INTO credentials (uid, email, salt, password_hash, iterations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    doctor_id.to_string(),
                    email,
                    STANDARD.encode(salt),
                    STANDARD.encode(hash.as_bytes()),
                    self.iterations,
                    now.to_rfc3339(),
                ],
            )?;
        }

        let session = Session {
            doctor_id,
            email,
            signed_in_at: now,
        };
        self.set_session(Some(session.clone()))?;
        tracing::info!(doctor_id = %doctor_id, "Doctor account created");
        Ok(session)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let had_session = self.current_session().is_some();
        if had_session {
            self.set_session(None)?;
            tracing::info!("Doctor signed out");
        }
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }
}
