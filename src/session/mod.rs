//! The locally known authenticated identity.
//!
//! [`SessionStore`] is the one intentionally shared cell in the runtime.
//! Its writers are all listed here:
//!
//! - [`refresh`](SessionStore::refresh) and [`login`](SessionStore::login)
//!   set the identity from `get_session`;
//! - [`logout`](SessionStore::logout) clears it;
//! - [`amend`](SessionStore::amend) edits the present identity in place;
//! - `invalidate` clears it whenever any query or mutation observes an
//!   `Unauthorized` failure.
//!
//! Readers get snapshots or subscriptions, never the cell itself.

use crate::api::{Api, LoginParameters, Session};
use crate::reactive::{Observable, Subscription};
use crate::transport::{ErrorKind, RemoteCallResult, TransportFault};

#[derive(Clone, Default)]
pub struct SessionStore {
    cell: Observable<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current identity.
    pub fn current(&self) -> Option<Session> {
        self.cell.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.with(Option::is_some)
    }

    /// Observe every change of identity.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        callback: impl Fn(&Option<Session>) + Send + Sync + 'static,
    ) -> Subscription {
        self.cell.subscribe(callback)
    }

    /// Ask the server who we are.
    ///
    /// Any answer other than an identity clears the session. A transport
    /// fault also clears it before being returned.
    pub async fn refresh(&self, api: &Api) -> Result<Option<Session>, TransportFault> {
        let identity = match api.get_session().await {
            Ok(Ok(identity)) => identity,
            Ok(Err(kind)) => {
                tracing::debug!(kind = %kind, "Session refresh failed");
                None
            }
            Err(fault) => {
                self.replace(None);
                return Err(fault);
            }
        };
        self.replace(identity.clone());
        Ok(identity)
    }

    /// Log in and, when the server accepts the credentials, load the session.
    ///
    /// A fault while loading the session is returned in place of the login
    /// result and leaves the session cleared. The server-side login still
    /// holds through the cookie, so a later [`refresh`](Self::refresh)
    /// picks the identity up.
    pub async fn login(
        &self,
        api: &Api,
        params: &LoginParameters,
    ) -> Result<RemoteCallResult<bool>, TransportFault> {
        let result = api.login(params).await?;
        match result {
            Ok(true) => {
                self.refresh(api).await?;
            }
            Err(ErrorKind::Unauthorized) => {
                self.invalidate();
            }
            _ => {}
        }
        Ok(result)
    }

    /// Log out on the server and forget the local identity.
    ///
    /// The local identity is dropped whatever the server answers.
    pub async fn logout(&self, api: &Api) -> Result<RemoteCallResult<()>, TransportFault> {
        let result = api.logout().await;
        self.replace(None);
        result
    }

    /// Edit the present identity in place. Returns `false` when there is
    /// no identity to edit.
    pub fn amend(&self, edit: impl FnOnce(&mut Session)) -> bool {
        self.cell
            .try_update(|current| match current {
                Some(session) => {
                    edit(session);
                    Ok(())
                }
                None => Err(()),
            })
            .is_ok()
    }

    /// Clear the identity after an `Unauthorized` failure.
    ///
    /// Returns `true` if an identity was present.
    pub(crate) fn invalidate(&self) -> bool {
        let cleared = self
            .cell
            .try_update(|current| match current.take() {
                Some(_) => Ok(()),
                None => Err(()),
            })
            .is_ok();
        if cleared {
            tracing::info!("Session invalidated by unauthorized response");
        }
        cleared
    }

    fn replace(&self, identity: Option<Session>) {
        let changed = self.cell.with(|current| current != &identity);
        if changed {
            match &identity {
                Some(session) => tracing::info!(user = %session.username, "Session established"),
                None => tracing::info!("Session cleared"),
            }
        }
        self.cell.set(identity);
    }

    #[cfg(test)]
    pub(crate) fn set_for_test(&self, identity: Option<Session>) {
        self.cell.set(identity);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
