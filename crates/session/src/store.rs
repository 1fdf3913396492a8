//! The session store: one credential, one identity, serialized mutations.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use eligo_auth::{Credential, Identity, ViewSelector, decode_credential, resolve_view};

use crate::error::{SessionError, StorageError};
use crate::storage::CredentialStorage;

/// A committed session: the raw credential and the identity decoded from it.
///
/// Both halves only ever exist together, which is what keeps "identity is
/// present iff a credential is held" true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    credential: Credential,
    identity: Identity,
}

impl ActiveSession {
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn view(&self) -> ViewSelector {
        resolve_view(Some(&self.identity))
    }
}

/// Authenticated session of the client.
///
/// Mutations (`login`, `logout`, `invalidate`, `restore`) are serialized:
/// - `login` and `restore` are **rejected** with `SessionBusy` while another
///   mutation is in flight; the earlier call wins.
/// - `logout` and `invalidate` **queue** behind the in-flight mutation, so a
///   forced logout is never dropped.
///
/// Reads never wait and always observe a committed state.
pub struct SessionStore {
    storage: Arc<dyn CredentialStorage>,
    state: watch::Sender<Option<ActiveSession>>,
    mutation: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            storage,
            state,
            mutation: Mutex::new(()),
        }
    }

    /// Establish a session from a raw credential.
    ///
    /// Validation and decoding happen before anything is touched, so a
    /// failure leaves both storage and the current session as they were.
    pub async fn login(&self, raw: &str) -> Result<Identity, SessionError> {
        let credential = Credential::new(raw)?;
        let identity = decode_credential(&credential).inspect_err(|e| {
            tracing::warn!(error = %e, "rejecting credential that does not decode");
        })?;

        let _guard = self
            .mutation
            .try_lock()
            .map_err(|_| SessionError::SessionBusy)?;

        self.storage.set(credential.expose()).await?;

        let session = ActiveSession {
            credential,
            identity: identity.clone(),
        };
        let view = session.view();
        self.state.send_replace(Some(session));

        tracing::info!(role = %identity.role, %view, "session established");
        Ok(identity)
    }

    /// End the session. Always succeeds; a no-op when already logged out.
    ///
    /// The in-memory session is cleared even when storage misbehaves. If
    /// durable storage could not be emptied the error is returned, so the
    /// caller can tell the user the credential may come back on restore.
    pub async fn logout(&self) -> Option<StorageError> {
        let _guard = self.mutation.lock().await;
        self.clear_locked("logout").await
    }

    /// Forced logout for a credential the service rejected.
    ///
    /// Only clears the session if `credential` is still the one held, so a
    /// late 401 for an old session cannot end a newer one. Returns whether
    /// the session was cleared.
    pub async fn invalidate(&self, credential: &Credential) -> bool {
        let _guard = self.mutation.lock().await;

        let is_current = self
            .state
            .borrow()
            .as_ref()
            .is_some_and(|s| s.credential == *credential);
        if !is_current {
            tracing::debug!("ignoring invalidation for a credential that is no longer current");
            return false;
        }

        if let Some(e) = self.clear_locked("invalidated").await {
            tracing::error!(error = %e, "rejected credential is still in durable storage");
        }
        true
    }

    /// Re-establish the session left in durable storage by an earlier run.
    ///
    /// A stored value that no longer decodes is removed from storage; an
    /// empty one counts as nothing stored.
    pub async fn restore(&self) -> Result<Option<Identity>, SessionError> {
        let _guard = self
            .mutation
            .try_lock()
            .map_err(|_| SessionError::SessionBusy)?;

        let Some(raw) = self
            .storage
            .get()
            .await?
            .filter(|raw| !raw.trim().is_empty())
        else {
            return Ok(None);
        };

        let decoded = Credential::new(raw)
            .and_then(|credential| decode_credential(&credential).map(|id| (credential, id)));

        match decoded {
            Ok((credential, identity)) => {
                let session = ActiveSession {
                    credential,
                    identity: identity.clone(),
                };
                let view = session.view();
                self.state.send_replace(Some(session));
                tracing::info!(role = %identity.role, %view, "session restored");
                Ok(Some(identity))
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding stored credential");
                match self.forget_stored("discarded").await {
                    Some(e) => Err(e.into()),
                    None => Ok(None),
                }
            }
        }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().as_ref().map(|s| s.identity.clone())
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.state.borrow().as_ref().map(|s| s.credential.clone())
    }

    pub fn current_session(&self) -> Option<ActiveSession> {
        self.state.borrow().clone()
    }

    pub fn current_view(&self) -> ViewSelector {
        resolve_view(self.state.borrow().as_ref().map(|s| &s.identity))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Register an observer of session changes.
    pub fn subscribe(&self) -> SessionWatch {
        SessionWatch {
            rx: self.state.subscribe(),
        }
    }

    async fn clear_locked(&self, reason: &'static str) -> Option<StorageError> {
        let was_empty = self.state.borrow().is_none();
        if was_empty {
            tracing::debug!(reason, "no session to clear");
            return None;
        }

        let failure = self.forget_stored(reason).await;
        self.state.send_replace(None);

        tracing::info!(reason, "session cleared");
        failure
    }

    /// Remove the stored credential. When storage refuses to delete, an
    /// empty value is written over it instead; restore reads that as empty.
    async fn forget_stored(&self, reason: &'static str) -> Option<StorageError> {
        let Err(e) = self.storage.clear().await else {
            return None;
        };
        tracing::warn!(error = %e, reason, "failed to clear credential storage; blanking it");

        match self.storage.set("").await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(error = %e, reason, "stored credential could not be removed");
                Some(e)
            }
        }
    }
}

/// Observer handle returned by [`SessionStore::subscribe`].
///
/// Notifications coalesce: after `changed` returns, the handle reflects the
/// latest committed state, never an intermediate one.
#[derive(Debug, Clone)]
pub struct SessionWatch {
    rx: watch::Receiver<Option<ActiveSession>>,
}

impl SessionWatch {
    /// Wait for the next committed change. Returns `false` once the store is
    /// gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.rx.borrow().as_ref().map(|s| s.identity.clone())
    }

    pub fn view(&self) -> ViewSelector {
        resolve_view(self.rx.borrow().as_ref().map(|s| &s.identity))
    }
}
