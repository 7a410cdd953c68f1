//! Periodic review-request polling.
//!
//! [`PollScheduler`] runs one poll cycle immediately on [`start`], then
//! every [`POLL_PERIOD`]. A cycle fetches the review list, notifies about
//! pull requests that were not there last time, renders the full list, and
//! only then replaces the snapshot.
//!
//! Cycles never overlap: they run inline in the scheduler task, and timer
//! ticks that fire while a cycle is in flight are skipped.
//!
//! [`start`]: PollScheduler::start

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use nag_github::PullRequestRef;
use tokio::sync::{Notify, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::detect::PollSnapshot;
use crate::publish::{Notifier, Renderer, ReviewNotification};
use crate::repo_name::RepoName;
use crate::review::{ReviewQueryEngine, SearchIssues};

/// Time between poll cycles.
pub const POLL_PERIOD: Duration = Duration::from_secs(60);

/// Mutable state shared by the scheduler handle and its task.
#[derive(Debug, Default)]
struct Session {
    running: bool,
    /// Bumped on every stop; a cycle only publishes if it still matches.
    generation: u64,
    snapshot: PollSnapshot,
    current: Vec<PullRequestRef>,
    repositories: Vec<RepoName>,
}

struct Inner<S, N, R> {
    engine: ReviewQueryEngine<S>,
    notifier: N,
    renderer: R,
    notifications_enabled: AtomicBool,
    refresh: Notify,
    session: Mutex<Session>,
}

impl<S, N, R> Inner<S, N, R>
where
    S: SearchIssues,
    N: Notifier,
    R: Renderer,
{
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, mut stop: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(POLL_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {}
                () = self.refresh.notified() => debug!("refresh requested"),
            }

            self.cycle().await;
        }

        debug!("poll task exiting");
    }

    async fn cycle(&self) {
        let (generation, repositories) = {
            let session = self.session();
            if !session.running {
                return;
            }
            (session.generation, session.repositories.clone())
        };

        let prs = match self.engine.fetch_review_requests(&repositories).await {
            Ok(prs) => prs,
            Err(e) => {
                warn!(error = %e, "poll failed; keeping previous results");
                return;
            }
        };

        let mut session = self.session();
        if !session.running || session.generation != generation {
            debug!("scheduler stopped during poll; discarding results");
            return;
        }

        let fresh = session.snapshot.newly_visible(&prs);
        if self.notifications_enabled.load(Ordering::Relaxed) {
            for pr in &fresh {
                self.notifier.send(&ReviewNotification::for_pull_request(pr));
            }
        }
        self.renderer.render(&prs, true);

        session.snapshot.replace(&prs);
        info!(count = prs.len(), new = fresh.len(), "poll complete");
        session.current = prs;
    }
}

/// Polls for review requests while the user is signed in.
pub struct PollScheduler<S, N, R> {
    inner: Arc<Inner<S, N, R>>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl<S, N, R> PollScheduler<S, N, R>
where
    S: SearchIssues + 'static,
    N: Notifier + 'static,
    R: Renderer + 'static,
{
    /// Create a stopped scheduler.
    pub fn new(engine: ReviewQueryEngine<S>, notifier: N, renderer: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                notifier,
                renderer,
                notifications_enabled: AtomicBool::new(true),
                refresh: Notify::new(),
                session: Mutex::new(Session::default()),
            }),
            stop: Mutex::new(None),
        }
    }

    /// Start polling: one cycle now, then every [`POLL_PERIOD`].
    ///
    /// Does nothing if already running. Must be called from inside a tokio
    /// runtime.
    pub fn start(&self) {
        let mut stop = self.stop.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let mut session = self.inner.session();
            if session.running {
                return;
            }
            session.running = true;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(Arc::clone(&self.inner).run(stop_rx));
        *stop = Some(stop_tx);

        info!(period_secs = POLL_PERIOD.as_secs(), "poll scheduler started");
    }

    /// Stop polling and forget every pull request seen so far.
    ///
    /// A cycle in flight may finish its requests but publishes nothing.
    /// The next [`start`](Self::start) behaves like the very first one.
    pub fn stop(&self) {
        let stop = self
            .stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        {
            let mut session = self.inner.session();
            if !session.running {
                return;
            }
            session.running = false;
            session.generation += 1;
            session.snapshot.clear();
            session.current.clear();
            self.inner.renderer.render(&[], false);
        }

        if let Some(stop) = stop {
            // The task may already be gone; nothing to do then.
            let _ = stop.send(());
        }

        info!("poll scheduler stopped");
    }

    /// Run an extra cycle as soon as possible. Ignored while stopped.
    pub fn refresh(&self) {
        if self.is_running() {
            self.inner.refresh.notify_one();
        }
    }

    /// Replace the monitored repositories used by later cycles.
    pub fn set_repositories(&self, repositories: Vec<RepoName>) {
        self.inner.session().repositories = repositories;
    }

    /// Monitored repositories. Empty means "every repository".
    pub fn repositories(&self) -> Vec<RepoName> {
        self.inner.session().repositories.clone()
    }

    /// Turn notifications for new review requests on or off.
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.inner
            .notifications_enabled
            .store(enabled, Ordering::Relaxed);
    }

    /// The most recently published review list.
    pub fn current(&self) -> Vec<PullRequestRef> {
        self.inner.session().current.clone()
    }

    /// Whether the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.inner.session().running
    }
}
