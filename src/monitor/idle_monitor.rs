//! Idle session monitor background task

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    boundary::{Navigator, Notice, NoticeId, Notifier, SessionAuthority, Severity},
    state::{MonitorState, Phase},
};

use super::events::{ActivityKind, MonitorCommand};

/// Sleep target used while no deadline is armed; the branch is disabled by
/// its precondition, so this future is constructed but never polled.
const PARK_BACKSTOP: Duration = Duration::from_secs(24 * 3600);

/// Timing and routing configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Total idle budget before forced logout
    pub inactivity_timeout: Duration,
    /// Trailing portion of the budget during which the warning is shown
    pub warning_period: Duration,
    /// Redirect target after a forced logout
    pub login_path: String,
}

impl MonitorConfig {
    /// Delay from a reset to the warning
    fn main_delay(&self) -> Duration {
        self.inactivity_timeout.saturating_sub(self.warning_period)
    }
}

/// Collaborators the monitor drives
pub struct MonitorDeps {
    pub authority: Arc<dyn SessionAuthority>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

/// Command side of a running monitor task
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<MonitorCommand>,
    state_rx: watch::Receiver<MonitorState>,
}

impl MonitorHandle {
    pub fn session_started(&self) -> Result<(), String> {
        self.send(MonitorCommand::SessionStarted)
    }

    pub fn session_ended(&self) -> Result<(), String> {
        self.send(MonitorCommand::SessionEnded)
    }

    pub fn activity(&self, kind: ActivityKind) -> Result<(), String> {
        self.send(MonitorCommand::Activity(kind))
    }

    pub fn stay_connected(&self) -> Result<(), String> {
        self.send(MonitorCommand::StayConnected)
    }

    /// Current published monitor state
    pub fn snapshot(&self) -> MonitorState {
        self.state_rx.borrow().clone()
    }

    fn send(&self, command: MonitorCommand) -> Result<(), String> {
        self.tx
            .send(command)
            .map_err(|e| format!("Idle monitor task is not running: {}", e))
    }
}

/// The idle session state machine
///
/// Owns the single countdown pair for the current session. All timer handles
/// live here; every transition away from a phase first drops the deadlines it
/// armed, so no stale wakeup can act after a reset or teardown.
pub struct IdleMonitor {
    config: MonitorConfig,
    deps: MonitorDeps,
    state_tx: watch::Sender<MonitorState>,
    phase: Option<Phase>,
    main_deadline: Option<Instant>,
    warning_deadline: Option<Instant>,
    warning_notice: Option<NoticeId>,
    terminated: bool,
}

impl IdleMonitor {
    pub fn new(config: MonitorConfig, deps: MonitorDeps, state_tx: watch::Sender<MonitorState>) -> Self {
        Self {
            config,
            deps,
            state_tx,
            phase: None,
            main_deadline: None,
            warning_deadline: None,
            warning_notice: None,
            terminated: false,
        }
    }

    /// Deadline the current phase is waiting on, if any
    fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Some(Phase::Watching) => self.main_deadline,
            Some(Phase::Warning) => self.warning_deadline,
            _ => None,
        }
    }

    fn handle_command(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::SessionStarted => {
                debug!("Session started, arming idle countdown");
                self.terminated = false;
                self.start_or_reset();
            }
            MonitorCommand::SessionEnded => self.teardown("session ended externally"),
            MonitorCommand::Activity(kind) => self.on_activity(kind),
            MonitorCommand::StayConnected => self.stay_connected(),
        }
    }

    /// Cancel any pending countdown and, if a session is active, arm a fresh
    /// main deadline. Safe to call arbitrarily often.
    fn start_or_reset(&mut self) {
        self.cancel_countdown();

        if self.deps.authority.current_session().is_none() {
            debug!("No active session, idle monitor staying dormant");
            self.phase = None;
            self.publish();
            return;
        }

        let delay = self.config.main_delay();
        self.phase = Some(Phase::Watching);
        self.main_deadline = Some(Instant::now() + delay);
        self.publish();
        debug!("Idle countdown armed, warning due in {:?}", delay);
    }

    fn on_activity(&mut self, kind: ActivityKind) {
        match self.phase {
            Some(Phase::Watching) => {
                debug!("Qualifying activity ({:?}), resetting idle countdown", kind);
                self.start_or_reset();
            }
            Some(Phase::Warning) => {
                // Incidental input must not flicker the warning away; only
                // the explicit stay-connected action cancels it.
                debug!("Ignoring {:?} while the logout warning is showing", kind);
            }
            Some(Phase::Terminated) | None => {
                debug!("Ignoring {:?} with no armed countdown", kind);
            }
        }
    }

    async fn on_deadline(&mut self) {
        match self.phase {
            Some(Phase::Watching) => self.enter_warning(),
            Some(Phase::Warning) => self.force_logout().await,
            _ => debug!("Deadline fired with no armed phase, ignoring"),
        }
    }

    fn enter_warning(&mut self) {
        let warning_secs = self.config.warning_period.as_secs();
        info!(
            "Inactivity budget nearly exhausted, forced logout in {}s",
            warning_secs
        );

        self.phase = Some(Phase::Warning);
        self.main_deadline = None;
        self.warning_deadline = Some(Instant::now() + self.config.warning_period);

        let id = self.deps.notifier.show(Notice {
            title: "Session about to expire".to_string(),
            body: format!("You will be logged out in {} seconds for inactivity", warning_secs),
            severity: Severity::Warning,
            duration: Some(self.config.warning_period),
        });
        self.warning_notice = Some(id);
        self.publish();
    }

    async fn force_logout(&mut self) {
        if self.terminated {
            debug!("Forced logout already executed for this session, ignoring");
            return;
        }
        self.terminated = true;

        info!("Warning period elapsed with no response, forcing logout");
        self.cancel_countdown();
        self.phase = Some(Phase::Terminated);
        self.publish();

        // The local outcome is unconditional; a failed remote termination is
        // only worth a log line.
        if let Err(e) = self.deps.authority.terminate_session().await {
            warn!("Failed to terminate remote session: {}", e);
        }

        self.deps.notifier.show(Notice {
            title: "Session expired".to_string(),
            body: "You were logged out due to inactivity".to_string(),
            severity: Severity::Error,
            duration: None,
        });
        self.deps.navigator.redirect(&self.config.login_path);
    }

    fn stay_connected(&mut self) {
        if self.phase != Some(Phase::Warning) {
            debug!("Stay-connected requested outside the warning phase, ignoring");
            return;
        }

        info!("Stay-connected requested, extending the session");
        self.start_or_reset();
        self.deps.notifier.show(Notice {
            title: "Session extended".to_string(),
            body: "You remain connected".to_string(),
            severity: Severity::Info,
            duration: Some(Duration::from_secs(3)),
        });
    }

    /// Drop all pending deadlines and dismiss the warning notice if shown
    fn cancel_countdown(&mut self) {
        self.main_deadline = None;
        self.warning_deadline = None;
        if let Some(id) = self.warning_notice.take() {
            self.deps.notifier.dismiss(id);
        }
    }

    /// Return the monitor to its dormant state
    fn teardown(&mut self, reason: &str) {
        debug!("Tearing down idle monitor: {}", reason);
        self.cancel_countdown();
        self.phase = None;
        self.publish();
    }

    fn publish(&self) {
        let snapshot = MonitorState {
            phase: self.phase,
            main_deadline: self.main_deadline,
            warning_deadline: self.warning_deadline,
        };
        if let Err(e) = self.state_tx.send(snapshot) {
            warn!("Failed to publish monitor state: {}", e);
        }
    }
}

/// Background task that runs the idle monitor state machine
///
/// Commands and deadline expiries are serialized through this single task, so
/// an activity reset and a timer firing can never race: whichever arrives
/// first wins and the other sees the updated state.
pub async fn idle_monitor_task(
    mut monitor: IdleMonitor,
    mut rx: mpsc::UnboundedReceiver<MonitorCommand>,
) {
    info!(
        "Starting idle monitor task (budget {:?}, warning {:?})",
        monitor.config.inactivity_timeout, monitor.config.warning_period
    );

    loop {
        let deadline = monitor.next_deadline();

        tokio::select! {
            command = rx.recv() => {
                match command {
                    Some(command) => monitor.handle_command(command),
                    None => {
                        debug!("All monitor handles dropped, stopping idle monitor");
                        break;
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(|| Instant::now() + PARK_BACKSTOP)),
                if deadline.is_some() =>
            {
                monitor.on_deadline().await;
            }
        }
    }

    monitor.teardown("idle monitor task stopping");
}

/// Create the monitor channels, spawn the task, and return the command handle
pub fn spawn_idle_monitor(config: MonitorConfig, deps: MonitorDeps) -> MonitorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(MonitorState::new());

    let monitor = IdleMonitor::new(config, deps, state_tx);
    tokio::spawn(idle_monitor_task(monitor, rx));

    MonitorHandle { tx, state_rx }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use crate::state::Session;

    use super::*;

    struct FakeAuthority {
        active: AtomicBool,
        terminations: AtomicUsize,
        fail_terminate: bool,
    }

    impl FakeAuthority {
        fn new(active: bool) -> Self {
            Self {
                active: AtomicBool::new(active),
                terminations: AtomicUsize::new(0),
                fail_terminate: false,
            }
        }

        fn failing(active: bool) -> Self {
            Self {
                fail_terminate: true,
                ..Self::new(active)
            }
        }
    }

    #[async_trait]
    impl SessionAuthority for FakeAuthority {
        fn current_session(&self) -> Option<Session> {
            if self.active.load(Ordering::SeqCst) {
                Some(Session::start())
            } else {
                None
            }
        }

        async fn terminate_session(&self) -> Result<(), String> {
            self.terminations.fetch_add(1, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
            if self.fail_terminate {
                Err("network unreachable".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<Notice>>,
        dismissed: Mutex<Vec<NoticeId>>,
    }

    impl RecordingNotifier {
        fn titles(&self) -> Vec<String> {
            self.shown.lock().unwrap().iter().map(|n| n.title.clone()).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, notice: Notice) -> NoticeId {
            let mut shown = self.shown.lock().unwrap();
            shown.push(notice);
            shown.len() as NoticeId
        }

        fn dismiss(&self, id: NoticeId) {
            self.dismissed.lock().unwrap().push(id);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        targets: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, path: &str) {
            self.targets.lock().unwrap().push(path.to_string());
        }
    }

    struct Harness {
        handle: MonitorHandle,
        authority: Arc<FakeAuthority>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
    }

    impl Harness {
        fn phase(&self) -> Option<Phase> {
            self.handle.snapshot().phase
        }

        fn terminations(&self) -> usize {
            self.authority.terminations.load(Ordering::SeqCst)
        }

        fn redirects(&self) -> Vec<String> {
            self.navigator.targets.lock().unwrap().clone()
        }
    }

    // Reference timing: 300s budget with a 5s warning tail
    fn harness_with(authority: FakeAuthority) -> Harness {
        let authority = Arc::new(authority);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());

        let config = MonitorConfig {
            inactivity_timeout: Duration::from_secs(300),
            warning_period: Duration::from_secs(5),
            login_path: "/login".to_string(),
        };
        let deps = MonitorDeps {
            authority: Arc::clone(&authority) as Arc<dyn SessionAuthority>,
            notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
            navigator: Arc::clone(&navigator) as Arc<dyn Navigator>,
        };
        let handle = spawn_idle_monitor(config, deps);

        Harness {
            handle,
            authority,
            notifier,
            navigator,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeAuthority::new(true))
    }

    /// Let the monitor task drain its command queue
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn frequent_activity_keeps_the_session_watching() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Watching));

        // 1000s of fake time in 100s strides, each under the 295s quiet limit
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(100)).await;
            h.handle.activity(ActivityKind::PointerMove).unwrap();
            settle().await;
            assert_eq!(h.phase(), Some(Phase::Watching));
        }

        assert_eq!(h.terminations(), 0);
        assert!(h.redirects().is_empty());
        assert!(h.notifier.titles().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_raises_the_warning() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(294)).await;
        assert_eq!(h.phase(), Some(Phase::Watching));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        let shown = h.notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].severity, Severity::Warning);
        assert_eq!(shown[0].duration, Some(Duration::from_secs(5)));
        assert!(shown[0].body.contains("5 seconds"));
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_warning_forces_logout_exactly_once() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(296)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(h.phase(), Some(Phase::Terminated));
        assert_eq!(h.terminations(), 1);
        assert_eq!(h.redirects(), vec!["/login".to_string()]);

        // Warning dismissed, expiry notice posted
        assert_eq!(h.notifier.dismissed.lock().unwrap().as_slice(), &[1]);
        assert_eq!(
            h.notifier.titles(),
            vec!["Session about to expire".to_string(), "Session expired".to_string()]
        );

        // Terminal phase: nothing further fires
        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(h.terminations(), 1);
        assert_eq!(h.redirects().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_remote_termination_still_logs_the_user_out() {
        let h = harness_with(FakeAuthority::failing(true));
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(302)).await;
        assert_eq!(h.phase(), Some(Phase::Terminated));
        assert_eq!(h.terminations(), 1);
        assert_eq!(h.redirects(), vec!["/login".to_string()]);
        assert!(h.notifier.titles().contains(&"Session expired".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn incidental_activity_does_not_cancel_the_warning() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(296)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        h.handle.activity(ActivityKind::PointerMove).unwrap();
        h.handle.activity(ActivityKind::Scroll).unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        // The pending logout still fires on schedule
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.phase(), Some(Phase::Terminated));
        assert_eq!(h.terminations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stay_connected_recovers_from_the_warning() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(296)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        h.handle.stay_connected().unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Watching));
        assert_eq!(h.notifier.dismissed.lock().unwrap().as_slice(), &[1]);
        assert!(h.notifier.titles().contains(&"Session extended".to_string()));

        // A fresh main deadline was armed: quiet again until 295s pass
        tokio::time::sleep(Duration::from_secs(294)).await;
        assert_eq!(h.phase(), Some(Phase::Watching));
        assert_eq!(h.terminations(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));
    }

    #[tokio::test(start_paused = true)]
    async fn stay_connected_outside_the_warning_is_ignored() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        h.handle.stay_connected().unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Watching));
        assert!(h.notifier.titles().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_and_reset_are_idempotent() {
        let h = harness();
        h.handle.session_started().unwrap();
        h.handle.session_started().unwrap();
        h.handle.session_started().unwrap();
        settle().await;

        // Repeated resets leave a single armed countdown
        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Watching));
        assert!(snapshot.main_deadline.is_some());
        assert!(snapshot.warning_deadline.is_none());

        h.handle.session_ended().unwrap();
        h.handle.session_ended().unwrap();
        h.handle.activity(ActivityKind::Click).unwrap();
        settle().await;

        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.phase, None);
        assert!(snapshot.main_deadline.is_none());
        assert!(snapshot.warning_deadline.is_none());

        // Nothing left to fire
        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(h.terminations(), 0);
        assert!(h.redirects().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn external_logout_during_the_warning_tears_down() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(296)).await;
        assert_eq!(h.phase(), Some(Phase::Warning));

        h.handle.session_ended().unwrap();
        settle().await;
        assert_eq!(h.phase(), None);
        // Warning notice is dismissed on teardown
        assert_eq!(h.notifier.dismissed.lock().unwrap().as_slice(), &[1]);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(h.terminations(), 0);
        assert!(h.redirects().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_session_means_nothing_is_scheduled() {
        let h = harness_with(FakeAuthority::new(false));
        h.handle.session_started().unwrap();
        h.handle.activity(ActivityKind::KeyDown).unwrap();
        settle().await;

        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.phase, None);
        assert!(snapshot.main_deadline.is_none());
        assert!(snapshot.warning_deadline.is_none());

        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(h.terminations(), 0);
        assert!(h.notifier.titles().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn a_fresh_session_rearms_after_termination() {
        let h = harness();
        h.handle.session_started().unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_secs(302)).await;
        assert_eq!(h.phase(), Some(Phase::Terminated));

        // Activity cannot revive a terminated instance
        h.handle.activity(ActivityKind::Click).unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Terminated));

        // A new session can
        h.authority.active.store(true, Ordering::SeqCst);
        h.handle.session_started().unwrap();
        settle().await;
        assert_eq!(h.phase(), Some(Phase::Watching));

        tokio::time::sleep(Duration::from_secs(302)).await;
        assert_eq!(h.phase(), Some(Phase::Terminated));
        assert_eq!(h.terminations(), 2);
    }
}
