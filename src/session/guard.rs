use crate::session::{
    affordance::{Affordance, ClickEvent, HeaderAffordanceState},
    config::GuardConfig,
    page::{KeyValueStore, Navigator, PageEnvironment},
    provider::{AuthEvent, IdentityProvider, Session},
    redirect,
};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::{broadcast, watch},
};
use tracing::{debug, error, info, warn};

/// Where the guard is in its per-page lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Uninitialized,
    /// A session probe is in flight.
    Checking,
    /// The last probe finished; affordances reflect it.
    Synced,
}

/// Published after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSnapshot {
    pub state: GuardState,
    /// Number of completed probes, the initial one included.
    pub generation: u64,
    /// Last successfully computed affordance state.
    pub affordances: Option<HeaderAffordanceState>,
}

struct Inner {
    config: GuardConfig,
    client: Arc<dyn IdentityProvider>,
    login_link: Option<Arc<dyn Affordance>>,
    logout_link: Option<Arc<dyn Affordance>>,
    navigator: Arc<dyn Navigator>,
    storage: Arc<dyn KeyValueStore>,
    sync: watch::Sender<SyncSnapshot>,
    ready: watch::Sender<bool>,
}

/// Handle on the page's session guard. Clones share the same guard.
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<Inner>,
}

impl SessionGuard {
    /// Wire the guard into the page.
    ///
    /// Returns `None`, after logging why, when the provider library is missing or
    /// there is no tokio runtime to drive the session probes; the page keeps
    /// working without a guard.
    #[must_use]
    pub fn init(page: PageEnvironment, config: GuardConfig) -> Option<Self> {
        let Some(factory) = page.provider else {
            error!("Identity provider library not loaded, session guard disabled");
            return None;
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("No async runtime available, session guard disabled: {err}");
                return None;
            }
        };

        let client = factory.create_client(&config.provider);
        let (sync, _) = watch::channel(SyncSnapshot::default());
        let (ready, _) = watch::channel(false);

        let guard = Self {
            inner: Arc::new(Inner {
                config,
                client,
                login_link: page.login_link,
                logout_link: page.logout_link,
                navigator: page.navigator,
                storage: page.storage,
                sync,
                ready,
            }),
        };

        // Subscribe before the first probe so no change can slip between the two.
        let notifications = guard.inner.client.subscribe();

        guard.attach_logout(&runtime);
        guard.remember_next_param();

        // The task owns the state for as long as the provider keeps notifying.
        runtime.spawn(run(Arc::clone(&guard.inner), notifications));

        Some(guard)
    }

    /// The wrapped identity-provider client.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.client
    }

    /// Resolves once the initial session probe has finished, whatever its outcome.
    pub async fn ready(&self) {
        let mut ready = self.inner.ready.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    /// Follow probe progress and affordance state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SyncSnapshot> {
        self.inner.sync.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.inner.sync.borrow().state
    }

    #[must_use]
    pub fn affordances(&self) -> Option<HeaderAffordanceState> {
        self.inner.sync.borrow().affordances
    }

    /// Current session; a provider failure reads as no session.
    pub async fn get_session(&self) -> Option<Session> {
        match self.inner.client.get_session().await {
            Ok(session) => session,
            Err(err) => {
                debug!("get_session failed: {err}");
                None
            }
        }
    }

    /// Return the session, or send the visitor to the login page with the
    /// current path as `next` when `redirect_if_missing` is set.
    pub async fn require_auth(&self, redirect_if_missing: bool) -> Option<Session> {
        if let Some(session) = self.get_session().await {
            return Some(session);
        }

        if redirect_if_missing {
            let location = self.inner.navigator.location();
            let href = redirect::login_href(&self.inner.config.login_page, location.path());
            info!("No session, redirecting to {href}");
            self.inner.navigator.navigate(&href);
        }

        None
    }

    /// Go to the remembered destination, or the default one.
    ///
    /// The remembered path is left in storage.
    // TODO: clear the stored intent here once consume-on-read is confirmed for the product.
    pub fn redirect_after_auth(&self) {
        let target = redirect::redirect_target(
            self.inner.storage.as_ref(),
            &self.inner.config.storage_key,
            &self.inner.config.default_destination,
        );
        self.inner.navigator.navigate(&target);
    }

    /// Sign out, then go to the login page even if signing out failed.
    pub async fn sign_out(&self) {
        sign_out_then_leave(
            self.inner.client.as_ref(),
            self.inner.navigator.as_ref(),
            &self.inner.config.login_page,
        )
        .await;
    }

    fn attach_logout(&self, runtime: &Handle) {
        let Some(logout) = &self.inner.logout_link else {
            return;
        };

        // The link owns this handler, so it must not hold `Inner` itself.
        let client = Arc::clone(&self.inner.client);
        let navigator = Arc::clone(&self.inner.navigator);
        let login_page = self.inner.config.login_page.clone();
        let runtime = runtime.clone();
        logout.on_click(Box::new(move |event: &dyn ClickEvent| {
            event.prevent_default();
            let client = Arc::clone(&client);
            let navigator = Arc::clone(&navigator);
            let login_page = login_page.clone();
            runtime.spawn(async move {
                sign_out_then_leave(client.as_ref(), navigator.as_ref(), &login_page).await;
            });
        }));
    }

    fn remember_next_param(&self) {
        let location = self.inner.navigator.location();
        if let Some(next) = redirect::remember_next_param(
            &location,
            self.inner.storage.as_ref(),
            &self.inner.config.storage_key,
        ) {
            debug!("Remembered next={next}");
        }
    }
}

async fn sign_out_then_leave(
    client: &dyn IdentityProvider,
    navigator: &dyn Navigator,
    login_page: &str,
) {
    if let Err(err) = client.sign_out().await {
        warn!("Sign-out failed: {err}");
    }
    navigator.navigate(login_page);
}

// Initial probe, then one probe per notification, strictly in sequence.
// The loop ends when the provider drops its sender.
async fn run(inner: Arc<Inner>, mut notifications: broadcast::Receiver<AuthEvent>) {
    sync_affordances(&inner).await;
    inner.ready.send_replace(true);

    loop {
        match notifications.recv().await {
            Ok(event) => debug!("Auth state change: {event:?}"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Missed {skipped} auth notifications, resyncing once");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }

        sync_affordances(&inner).await;
    }
}

async fn sync_affordances(inner: &Inner) {
    inner
        .sync
        .send_modify(|snapshot| snapshot.state = GuardState::Checking);

    let affordances = match inner.client.get_session().await {
        Ok(session) => {
            let state = HeaderAffordanceState::for_session(session.is_some());
            state.apply(inner.login_link.as_deref(), inner.logout_link.as_deref());
            Some(state)
        }
        Err(err) => {
            // Links keep their last known state.
            debug!("Session probe failed: {err}");
            None
        }
    };

    inner.sync.send_modify(|snapshot| {
        snapshot.state = GuardState::Synced;
        snapshot.generation += 1;
        if affordances.is_some() {
            snapshot.affordances = affordances;
        }
    });
}
