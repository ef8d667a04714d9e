//! Application context - dependency injection container

use std::path::Path;
use std::sync::Arc;

use assessor_core::{
    requires_confirmation, AuthService, CredentialRejectionHandler, DraftWizard,
    HistoryNavigator, ListBackend, ListView, LiveEventDispatcher, LiveUpdateReconciler,
    Navigator, ProjectCache, ProjectSetupApi, RefreshSignal, Resolution, Router,
    SearchDebouncer, SessionInvalidator, SessionStore, ToastQueue,
};
use assessor_domain::constants::LOGIN_PATH;
use assessor_domain::{
    AssessorError, ClientConfig, LiveDelivery, ProjectSummary, ReportSummary, Result, Session,
};
use assessor_infra::api::{
    ApiClient, ApiClientConfig, AssessorApi, ProjectListBackend, ReportListBackend,
};
use assessor_infra::config;
use assessor_infra::live::{LiveConnectionManager, LiveEndpoint};
use assessor_infra::storage::FileCredentialStore;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const LIVE_EVENT_BUFFER: usize = 64;

/// Application context - holds all stores, services and the live channel
pub struct AppContext {
    pub config: ClientConfig,

    // Session
    pub credentials: Arc<FileCredentialStore>,
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthService>,

    // Navigation
    pub navigator: Arc<HistoryNavigator>,
    pub router: Arc<Router>,

    // Global stores
    pub toasts: Arc<ToastQueue>,
    pub refresh: Arc<RefreshSignal>,
    pub projects: Arc<ProjectCache>,

    // Backend
    pub api_client: Arc<ApiClient>,
    pub api: Arc<AssessorApi>,

    // Live updates
    pub dispatcher: Arc<LiveEventDispatcher>,
    pub live: Arc<LiveConnectionManager>,
    live_events: Mutex<Option<mpsc::Receiver<LiveDelivery>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AppContext {
    /// Create a context from the environment or the first config file found
    pub fn new() -> Result<Self> {
        Self::new_with_config(config::load()?)
    }

    /// Create a context from an explicit configuration
    ///
    /// # Errors
    /// Returns `AssessorError::Config` if the API or live channel URL is
    /// unusable.
    pub fn new_with_config(config: ClientConfig) -> Result<Self> {
        let credentials = Arc::new(FileCredentialStore::new(Path::new(
            &config.storage.credential_path,
        )));
        let session = Arc::new(SessionStore::new(credentials.clone()));
        let navigator = Arc::new(HistoryNavigator::new(LOGIN_PATH));
        let router = Arc::new(Router::standard());

        let on_rejected: Arc<dyn CredentialRejectionHandler> =
            Arc::new(SessionInvalidator::new(session.clone(), navigator.clone()));
        let api_client = Arc::new(
            ApiClient::new(ApiClientConfig::from(&config.api), credentials.clone(), Some(on_rejected))
                .map_err(AssessorError::from)?,
        );
        let api = Arc::new(AssessorApi::new(api_client.clone()));
        let auth = Arc::new(AuthService::new(api.clone(), session.clone(), navigator.clone()));

        let toasts = Arc::new(ToastQueue::new(config.ui.toast_capacity));
        let refresh = Arc::new(RefreshSignal::new());
        let projects = Arc::new(ProjectCache::new(Arc::new(ProjectListBackend::new(
            api_client.clone(),
        ))));

        let reconciler = LiveUpdateReconciler::new(
            router.clone(),
            navigator.clone(),
            toasts.clone(),
            refresh.clone(),
        )
        .with_dedupe_window(config.live.dedupe_window());
        let dispatcher = Arc::new(LiveEventDispatcher::new(Arc::new(reconciler)));

        let endpoint = LiveEndpoint::from_config(&config.live, &config.api.base_url)?;
        let (events_tx, events_rx) = mpsc::channel(LIVE_EVENT_BUFFER);
        let live =
            Arc::new(LiveConnectionManager::new(endpoint, config.live.reconnect_delay(), events_tx));

        info!(api = %config.api.base_url, "application context created");

        Ok(Self {
            config,
            credentials,
            session,
            auth,
            navigator,
            router,
            toasts,
            refresh,
            projects,
            api_client,
            api,
            dispatcher,
            live,
            live_events: Mutex::new(Some(events_rx)),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Restore the persisted session and start the background tasks:
    /// live event dispatch and the identity follower that keeps the live
    /// channel scoped to the signed-in user.
    ///
    /// Must be called from within a tokio runtime. Calling it twice is a
    /// no-op.
    pub fn start(&self) -> Option<Session> {
        let restored = self.auth.rehydrate();
        if let Some(session) = &restored {
            let current = self.navigator.current_path();
            if let Resolution::Redirect(to) = self.router.resolve(&current, Some(session)) {
                self.navigator.replace(&to);
            }
        }

        let Some(events) = self.live_events.lock().take() else {
            debug!("context already started");
            return restored;
        };

        let dispatcher = self.dispatcher.clone();
        let sessions = self.session.subscribe();
        let dispatch = tokio::spawn(async move { dispatcher.run(events, sessions).await });

        let mut sessions = self.session.subscribe();
        let live = self.live.clone();
        let follow = tokio::spawn(async move {
            loop {
                let identity = sessions.borrow_and_update().as_ref().map(|s| s.user_id.clone());
                live.sync_identity(identity.as_deref());
                if sessions.changed().await.is_err() {
                    break;
                }
            }
            live.shutdown();
        });

        self.tasks.lock().extend([dispatch, follow]);
        restored
    }

    /// Stop background tasks and close the live channel
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.live.shutdown();
        info!("application context shut down");
    }

    /// Guarded navigation: applies the auth/role guard and moves to the
    /// resolved location.
    pub fn navigate(&self, path: &str) -> Resolution {
        let session = self.session.current();
        let resolution = self.router.resolve(path, session.as_ref());
        match &resolution {
            Resolution::Render(_) => self.navigator.navigate(path),
            Resolution::Redirect(to) => self.navigator.replace(to),
        }
        resolution
    }

    /// Whether leaving the current location for `to` needs a confirmation
    pub fn leave_needs_confirmation(&self, to: &str, wizard: &DraftWizard) -> bool {
        requires_confirmation(&self.router, &self.navigator.current_path(), to, wizard.status())
    }

    /// Sign out, close the live channel and return to the login page
    pub fn logout(&self) {
        self.auth.logout();
        self.live.sync_identity(None);
    }

    pub fn project_list(&self) -> ListView<ProjectSummary> {
        let backend: Arc<dyn ListBackend<ProjectSummary>> =
            Arc::new(ProjectListBackend::new(self.api_client.clone()));
        ListView::new(backend)
    }

    pub fn report_list(&self, project_id: &str) -> ListView<ReportSummary> {
        let backend: Arc<dyn ListBackend<ReportSummary>> =
            Arc::new(ReportListBackend::new(self.api_client.clone(), project_id));
        ListView::new(backend)
    }

    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(self.config.ui.search_debounce())
    }

    /// A fresh project draft wizard
    pub fn new_wizard(&self) -> DraftWizard {
        let api: Arc<dyn ProjectSetupApi> = self.api.clone();
        DraftWizard::new(api, self.toasts.clone())
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
