//! Session ownership and background token refresh.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Credentials, IdentityProvider, Session, TokenSource};
use crate::{Error, Result};

const EVENT_CAPACITY: usize = 16;

/// Result of [`TokenProvider::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A new session was opened.
    Authenticated,
    /// A valid session already existed; the identity provider was not contacted.
    AlreadyAuthenticated,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// [`TokenProvider::logout`] was called.
    UserRequested,
    /// The refresh loop could not renew the token.
    RefreshFailed,
}

/// Session lifecycle notifications, see [`TokenProvider::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was opened.
    Authenticated,
    /// Login was rejected or could not reach the identity provider.
    AuthenticationFailed {
        /// Display form of the error.
        error: String,
    },
    /// The session token was renewed.
    Refreshed,
    /// The session ended.
    LoggedOut {
        /// What ended it.
        reason: LogoutReason,
    },
}

/// Handle on a refresh loop started by [`TokenProvider::schedule_refresh`].
///
/// Dropping the handle leaves the loop running; it stops on [`cancel`](Self::cancel),
/// on logout, when another loop is scheduled, or when the provider is dropped.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    cancel: CancellationToken,
}

impl RefreshHandle {
    /// Stop the loop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the loop was told to stop or has stopped on its own.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct State {
    session: Option<Session>,
    next_generation: u64,
}

struct Inner<P> {
    identity: P,
    state: RwLock<State>,
    events: broadcast::Sender<SessionEvent>,
    refresh_task: Mutex<Option<CancellationToken>>,
    // held across the identity provider login
    login_gate: tokio::sync::Mutex<()>,
}

impl<P> Inner<P> {
    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_refresh_task(&self, task: Option<CancellationToken>) {
        let previous = std::mem::replace(
            &mut *self.refresh_task.lock().unwrap_or_else(PoisonError::into_inner),
            task,
        );
        if let Some(previous) = previous {
            previous.cancel();
        }
    }
}

impl<P> Drop for Inner<P> {
    fn drop(&mut self) {
        let task = self
            .refresh_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel();
        }
    }
}

/// What a refresh needs, captured under the read lock.
struct RefreshCandidate {
    generation: u64,
    refresh_token: Option<String>,
}

/// Owns the operator session and keeps its token fresh.
///
/// Cloning is cheap and every clone shares the same session. The provider is
/// the [`TokenSource`] handed to the bearer auth middleware, so every call
/// reads the token current at dispatch time.
///
/// ```ignore
/// let tokens = TokenProvider::new(KeycloakProvider::new(IdentityConfig::default()));
/// tokens.authenticate(&Credentials::password("admin@lsadf.com", "secret")).await?;
/// let _refresh = tokens.schedule_refresh(Duration::from_secs(60), Duration::from_secs(70));
///
/// let client = AdminClient::with_config(&ClientConfig::default(), tokens.clone());
/// ```
pub struct TokenProvider<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for TokenProvider<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> std::fmt::Debug for TokenProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("session", &self.inner.read_state().session)
            .finish_non_exhaustive()
    }
}

impl<P: IdentityProvider> TokenProvider<P> {
    /// Create a provider with no session.
    #[must_use]
    pub fn new(identity: P) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                identity,
                state: RwLock::new(State::default()),
                events,
                refresh_task: Mutex::new(None),
                login_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// The wrapped identity provider.
    #[must_use]
    pub fn identity(&self) -> &P {
        &self.inner.identity
    }

    /// Open a session unless a valid one exists.
    ///
    /// Concurrent calls log in one at a time; a caller that waited behind a
    /// successful login gets [`AuthOutcome::AlreadyAuthenticated`].
    ///
    /// # Errors
    ///
    /// Returns the identity provider's error when login fails; no token is
    /// stored and [`SessionEvent::AuthenticationFailed`] is emitted.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome> {
        if self.is_authenticated() {
            debug!("session still valid, skipping login");
            return Ok(AuthOutcome::AlreadyAuthenticated);
        }

        let _gate = self.inner.login_gate.lock().await;
        if self.is_authenticated() {
            debug!("session opened by a concurrent login");
            return Ok(AuthOutcome::AlreadyAuthenticated);
        }

        match self.inner.identity.login(credentials).await {
            Ok(response) => {
                let now = Instant::now();
                let generation = {
                    let mut state = self.inner.write_state();
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    state.session = Some(Session::from_response(response, now, generation));
                    generation
                };
                info!(generation, "authenticated");
                self.emit(SessionEvent::Authenticated);
                Ok(AuthOutcome::Authenticated)
            }
            Err(err) => {
                warn!(error = %err, "authentication failed");
                self.inner.write_state().session = None;
                self.emit(SessionEvent::AuthenticationFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Refresh the token if it expires within `min_validity`.
    ///
    /// Returns whether a new token was stored. A refresh that completes after
    /// the session ended is discarded and reported as `false`.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthenticated`] without a session, otherwise the identity
    /// provider's error. The session is left in place; the refresh loop is
    /// what turns a failure into a logout.
    pub async fn refresh_if_needed(&self, min_validity: Duration) -> Result<bool> {
        match self.refresh_candidate(min_validity)? {
            Some(candidate) => self.refresh_with(candidate).await,
            None => Ok(false),
        }
    }

    /// Start refreshing the token every `interval`, the first tick one
    /// `interval` from now.
    ///
    /// Replaces any loop started earlier. A tick without a session ends the
    /// loop; a failed refresh logs out with [`LogoutReason::RefreshFailed`]
    /// and ends the loop. Must be called within a tokio runtime.
    pub fn schedule_refresh(&self, interval: Duration, min_validity: Duration) -> RefreshHandle {
        let interval = interval.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        self.inner.replace_refresh_task(Some(cancel.clone()));

        let weak = Arc::downgrade(&self.inner);
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!("refresh loop cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !Self::tick(&weak, min_validity).await {
                            break;
                        }
                    }
                }
            }
            token.cancel();
        });

        debug!(interval_ms = interval.as_millis(), "refresh loop scheduled");
        RefreshHandle { cancel }
    }

    /// End the session here and at the identity provider.
    ///
    /// Local state is cleared and the refresh loop cancelled before the
    /// identity provider is contacted. Does nothing without a session.
    ///
    /// # Errors
    ///
    /// The identity provider's logout error, after the local session is gone.
    pub async fn logout(&self) -> Result<()> {
        self.end_session(LogoutReason::UserRequested, None).await
    }

    /// Whether a session with an unexpired access token exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let now = Instant::now();
        self.inner
            .read_state()
            .session
            .as_ref()
            .is_some_and(|session| !session.is_expired(now))
    }

    /// The session's access token, if there is a session.
    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.inner
            .read_state()
            .session
            .as_ref()
            .map(|session| session.access_token().to_string())
    }

    /// Receive session events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // no receivers is fine
        let _ = self.inner.events.send(event);
    }

    fn refresh_candidate(&self, min_validity: Duration) -> Result<Option<RefreshCandidate>> {
        let now = Instant::now();
        let state = self.inner.read_state();
        let session = state.session.as_ref().ok_or(Error::Unauthenticated)?;

        if session.remaining_validity(now) >= min_validity {
            return Ok(None);
        }
        Ok(Some(RefreshCandidate {
            generation: session.generation(),
            refresh_token: session
                .can_refresh(now)
                .then(|| session.refresh_token().map(str::to_string))
                .flatten(),
        }))
    }

    async fn refresh_with(&self, candidate: RefreshCandidate) -> Result<bool> {
        let RefreshCandidate {
            generation,
            refresh_token,
        } = candidate;
        let Some(refresh_token) = refresh_token else {
            return Err(Error::auth(
                "refresh_unavailable",
                Some("session has no usable refresh token".to_string()),
            ));
        };

        debug!(generation, "refreshing session token");
        let response = self.inner.identity.refresh(&refresh_token).await?;
        let now = Instant::now();

        let stored = {
            let mut state = self.inner.write_state();
            match state.session.take() {
                Some(session) if session.generation() == generation => {
                    state.session = Some(session.refreshed(response, now));
                    true
                }
                other => {
                    state.session = other;
                    false
                }
            }
        };

        if stored {
            info!(generation, "session token refreshed");
            self.emit(SessionEvent::Refreshed);
        } else {
            debug!(generation, "session ended during refresh, discarding tokens");
        }
        Ok(stored)
    }

    /// One refresh loop tick; returns whether the loop goes on.
    async fn tick(weak: &Weak<Inner<P>>, min_validity: Duration) -> bool {
        let Some(inner) = weak.upgrade() else {
            return false;
        };
        let provider = Self { inner };

        let candidate = match provider.refresh_candidate(min_validity) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return true,
            Err(_) => {
                debug!("no session, stopping refresh loop");
                return false;
            }
        };

        let generation = candidate.generation;
        match provider.refresh_with(candidate).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, generation, "token refresh failed, logging out");
                if let Err(err) = provider
                    .end_session(LogoutReason::RefreshFailed, Some(generation))
                    .await
                {
                    warn!(error = %err, "identity provider logout failed");
                }
                false
            }
        }
    }

    /// Clear the session and notify the identity provider.
    ///
    /// With `expected`, only the session of that generation is ended.
    async fn end_session(&self, reason: LogoutReason, expected: Option<u64>) -> Result<()> {
        let session = {
            let mut state = self.inner.write_state();
            let stale = expected.is_some_and(|generation| {
                state
                    .session
                    .as_ref()
                    .is_some_and(|session| session.generation() != generation)
            });
            if stale {
                return Ok(());
            }
            state.session.take()
        };
        self.inner.replace_refresh_task(None);

        let Some(session) = session else {
            debug!("no session to end");
            return Ok(());
        };

        info!(?reason, generation = session.generation(), "session ended");
        let result = self.inner.identity.logout(session.refresh_token()).await;
        self.emit(SessionEvent::LoggedOut { reason });

        result.inspect_err(|err| warn!(error = %err, "identity provider logout failed"))
    }
}

impl<P: IdentityProvider> TokenSource for TokenProvider<P> {
    fn token(&self) -> Option<String> {
        self.current_token()
    }
}
