//! Application state management for Cryptopedia.
//!
//! The `App` struct holds the UI state, the auth flows and the dashboard
//! data. Network calls run as spawned Tokio tasks that report back through
//! an MPSC channel; `tick` drains it on every loop iteration.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use cryptopedia_core::api::{ApiClient, ApiError};
use cryptopedia_core::auth::flow::{COMMENT, EMAIL, PASSWORD, PHONE_NUMBER};
use cryptopedia_core::auth::{FlowPhase, LoginFlow, Session, SignupModal, SignupRequestFlow};
use cryptopedia_core::config::Config;
use cryptopedia_core::dashboard::{self, DashboardEntry};
use cryptopedia_core::models::market::{demo_alerts, demo_heatmap, demo_tickers, AlertItem};
use cryptopedia_core::models::{MarketSnapshot, RvolEntry, TickerQuote, TokenPair};
use cryptopedia_core::navigation::{Route, RouteState};
use cryptopedia_core::notify::NotificationQueue;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// How often the ticker banner prices drift.
const TICKER_INTERVAL: Duration = Duration::from_secs(3);

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    RequestAccess,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::RequestAccess,
            LoginFocus::RequestAccess => LoginFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::RequestAccess,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::RequestAccess => LoginFocus::Button,
        }
    }

    /// Form field under focus, if any.
    pub fn field(self) -> Option<&'static str> {
        match self {
            LoginFocus::Email => Some(EMAIL),
            LoginFocus::Password => Some(PASSWORD),
            LoginFocus::Button | LoginFocus::RequestAccess => None,
        }
    }
}

/// Signup-request form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Email,
    Phone,
    Comment,
    Button,
}

impl SignupFocus {
    pub fn next(self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Phone,
            SignupFocus::Phone => SignupFocus::Comment,
            SignupFocus::Comment => SignupFocus::Button,
            SignupFocus::Button => SignupFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Button,
            SignupFocus::Phone => SignupFocus::Email,
            SignupFocus::Comment => SignupFocus::Phone,
            SignupFocus::Button => SignupFocus::Comment,
        }
    }

    pub fn field(self) -> Option<&'static str> {
        match self {
            SignupFocus::Email => Some(EMAIL),
            SignupFocus::Phone => Some(PHONE_NUMBER),
            SignupFocus::Comment => Some(COMMENT),
            SignupFocus::Button => None,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks.
enum TaskResult {
    Login(Result<TokenPair, ApiError>),
    Signup(Result<(), ApiError>),
    Dashboard(DashboardEntry),
}

/// A task result tagged with the screen it was started from.
struct TaskMessage {
    screen: u64,
    result: TaskResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub routes: RouteState,
    pub notifications: NotificationQueue,

    // UI State
    pub state: AppState,
    /// Route the UI is currently showing.
    pub screen: Route,
    /// Bumped whenever the screen changes; results from older screens are dropped.
    screen_id: u64,

    // Auth flows
    pub login: LoginFlow,
    pub login_focus: LoginFocus,
    pub signup: SignupRequestFlow,
    pub signup_focus: SignupFocus,

    // Dashboard data
    pub snapshot: Option<MarketSnapshot>,
    pub snapshot_loading: bool,
    pub snapshot_error: Option<String>,
    pub tickers: Vec<TickerQuote>,
    pub heatmap: Vec<RvolEntry>,
    pub alerts: Vec<AlertItem>,
    last_ticker_drift: Instant,

    // Background task channel
    task_rx: mpsc::Receiver<TaskMessage>,
    task_tx: mpsc::Sender<TaskMessage>,
}

impl App {
    /// Create the app. Call `start` to enter the current route.
    pub fn new(
        config: Config,
        api: ApiClient,
        routes: RouteState,
        notifications: NotificationQueue,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login = match config.last_email {
            Some(ref email) => LoginFlow::with_email(email),
            None => LoginFlow::new(),
        };
        let login_focus = if login.form().value(EMAIL).is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };

        Self {
            config,
            api,
            routes,
            notifications,

            state: AppState::Normal,
            screen: Route::Login,
            screen_id: 0,

            login,
            login_focus,
            signup: SignupRequestFlow::new(),
            signup_focus: SignupFocus::Email,

            snapshot: None,
            snapshot_loading: false,
            snapshot_error: None,
            tickers: demo_tickers(),
            heatmap: demo_heatmap(),
            alerts: demo_alerts(),
            last_ticker_drift: Instant::now(),

            task_rx: rx,
            task_tx: tx,
        }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Enter the starting route.
    pub fn start(&mut self) {
        let route = self.routes.current();
        self.enter_screen(route);
    }

    // =========================================================================
    // Main loop hooks
    // =========================================================================

    /// Follow navigation, apply finished tasks and advance timers.
    pub fn tick(&mut self) {
        let route = self.routes.current();
        if route != self.screen {
            self.enter_screen(route);
        }

        while let Ok(message) = self.task_rx.try_recv() {
            if message.screen != self.screen_id {
                debug!("Dropping task result for a screen that is no longer shown");
                continue;
            }
            self.apply_result(message.result);
        }

        if self.last_ticker_drift.elapsed() >= TICKER_INTERVAL {
            let mut rng = rand::thread_rng();
            for quote in &mut self.tickers {
                quote.drift(&mut rng);
            }
            self.last_ticker_drift = Instant::now();
        }

        self.notifications.prune(Utc::now());
    }

    fn enter_screen(&mut self, route: Route) {
        debug!(from = ?self.screen, to = ?route, "Screen change");
        self.screen = route;
        self.screen_id += 1;

        match route {
            Route::Login => {
                let email = self.login.form().value(EMAIL).to_string();
                self.login.reset();
                if let Some(form) = self.login.form_mut() {
                    form.set(EMAIL, &email);
                }
                self.login_focus = if email.is_empty() {
                    LoginFocus::Email
                } else {
                    LoginFocus::Password
                };
                self.signup = SignupRequestFlow::new();
                self.signup_focus = SignupFocus::Email;
                self.snapshot = None;
                self.snapshot_loading = false;
                self.snapshot_error = None;
            }
            Route::Dashboard => self.load_dashboard(),
        }
    }

    fn spawn_task<F>(&self, task: F)
    where
        F: std::future::Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let screen = self.screen_id;
        tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = tx.send(TaskMessage { screen, result }).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    fn apply_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Login(result) => {
                let email = self.login.form().value(EMAIL).to_string();
                let phase = self
                    .login
                    .finish(result, self.api.session(), &self.notifications);
                if phase == FlowPhase::Success {
                    self.remember_email(email);
                }
            }
            TaskResult::Signup(result) => {
                if self.signup.finish(result) == FlowPhase::Success {
                    self.signup_focus = SignupFocus::Email;
                }
            }
            TaskResult::Dashboard(entry) => {
                self.snapshot_loading = false;
                match entry {
                    DashboardEntry::Loaded(snapshot) => {
                        let quotes = snapshot.quotes();
                        if !quotes.is_empty() {
                            self.tickers = quotes;
                        }
                        self.snapshot_error = None;
                        self.snapshot = Some(snapshot);
                    }
                    DashboardEntry::Unavailable(e) => {
                        self.snapshot_error = Some(e.user_message());
                    }
                    DashboardEntry::Redirected => {}
                }
            }
        }
    }

    fn remember_email(&mut self, email: String) {
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Validate the login form and send it in the background.
    pub fn submit_login(&mut self) {
        let Some(submission) = self.login.begin_submit() else {
            return;
        };
        info!(email = %submission.email, "Submitting login");
        let api = self.api.clone();
        self.spawn_task(async move { TaskResult::Login(submission.send(&api).await) });
    }

    pub fn submit_signup(&mut self) {
        let Some(submission) = self.signup.begin_submit() else {
            return;
        };
        info!("Submitting signup request");
        let api = self.api.clone();
        self.spawn_task(async move { TaskResult::Signup(submission.send(&api).await) });
    }

    pub fn open_signup(&mut self) {
        self.signup.open();
        self.signup_focus = SignupFocus::Email;
    }

    /// Fetch the market snapshot for the dashboard.
    pub fn load_dashboard(&mut self) {
        if self.snapshot_loading {
            return;
        }
        self.snapshot_loading = true;
        let api = self.api.clone();
        self.spawn_task(async move { TaskResult::Dashboard(dashboard::enter(&api).await) });
    }

    pub fn logout(&mut self) {
        self.session().logout();
    }

    /// True while a modal on the login screen captures input.
    pub fn login_modal_open(&self) -> bool {
        self.login.error_modal().is_some() || self.signup.modal() != SignupModal::Closed
    }
}

#[cfg(test)]
impl App {
    /// In-memory app pointed at an address nothing listens on.
    pub(crate) fn for_test(route: Route, config: Config) -> Self {
        use std::sync::Arc;

        use cryptopedia_core::auth::{SessionProvider, TokenStore};
        use cryptopedia_core::config::StorageBackend;

        let routes = RouteState::new(route);
        let notes = NotificationQueue::new();
        let session =
            SessionProvider::new(TokenStore::in_memory(), Arc::new(routes.clone())).hydrate();
        let api = ApiClient::new("http://127.0.0.1:1", session, Arc::new(notes.clone()))
            .unwrap();
        let config = Config {
            storage: StorageBackend::Memory,
            ..config
        };
        App::new(config, api, routes, notes)
    }
}
