//! The crawl orchestrator
//!
//! A [`Spider`] owns a FIFO request queue and a two-stage concurrent
//! pipeline. Stage one executes the HTTP exchange through the
//! [`Transport`](crate::transport::Transport); stage two runs the
//! caller-supplied [`Parser`] with the `(Request, Response)` pair. The stages
//! are connected by a completion channel rather than a blocking call chain,
//! so a worker finishing a fetch does not have to run the (potentially slow)
//! parse logic before picking up the next fetch.
//!
//! Lifecycle: `Idle` → [`Spider::start`] → `Running` → [`Spider::wait`] /
//! [`Spider::stop`] → `Idle`. Requests can be added before or during a run;
//! a parse callback can add child requests through its [`SpiderHandle`] and
//! they are dispatched without further caller action. The spider is reusable
//! after a run finishes.
//!
//! # Example
//!
//! ```ignore
//! use scuttle::{Parser, Request, Response, Spider, SpiderHandle};
//!
//! struct LinkFollower;
//!
//! #[async_trait::async_trait]
//! impl Parser for LinkFollower {
//!     async fn parse(&self, spider: SpiderHandle, _request: Request, response: Response) {
//!         if let Ok(document) = response.html() {
//!             for anchor in document.css("a") {
//!                 if let Ok(href) = anchor.attribute("href") {
//!                     spider.add_url(href);
//!                 }
//!             }
//!         }
//!     }
//! }
//!
//! # async fn run() {
//! let spider = Spider::new(LinkFollower);
//! spider.add_url("https://example.org");
//! spider.start();
//! spider.wait().await;
//! # }
//! ```

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use futures_util::StreamExt;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::queue::RequestQueue;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};

const DEFAULT_WORKERS: usize = 8;

/// Caller-supplied parse stage
///
/// Invoked once per dispatched request, possibly concurrently for different
/// requests, with no ordering guarantee across requests. The callback may
/// enqueue child requests through the [`SpiderHandle`]; while the spider is
/// running they are dispatched immediately.
///
/// A panicking callback aborts only its own work item; other in-flight work
/// is unaffected and the fault is logged.
#[async_trait::async_trait]
pub trait Parser: Send + Sync + 'static {
    async fn parse(&self, spider: SpiderHandle, request: Request, response: Response);
}

/// Tracks outstanding pipeline work and signals when none remains
///
/// The counter covers a work item from the moment it is handed to the fetch
/// stage until its parse callback returns, so the count only reaches zero
/// when the whole pipeline, including work discovered mid-run, has drained.
#[derive(Clone, Default)]
pub struct PendingWork {
    count: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a work item entering the pipeline
    pub fn dispatched(&self) {
        // SeqCst keeps the increment totally ordered with the zero checks in
        // wait_idle(); a parse callback's child dispatch must be visible
        // before its own finished() runs.
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a work item leaving the pipeline
    ///
    /// Saturates at zero: after a reset(), stragglers from an abandoned run
    /// may still report in and must not underflow the counter.
    pub fn finished(&self) {
        let mut current = self.count.load(Ordering::SeqCst);
        while current > 0 {
            match self
                .count
                .compare_exchange(current, current - 1, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    if current == 1 {
                        self.idle.notify_waiters();
                    }
                    return;
                }
                Err(seen) => current = seen,
            }
        }
    }

    /// Abandon all tracked work and wake waiters
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
        self.idle.notify_waiters();
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Wait until no tracked work remains; returns immediately if already idle
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before re-checking the counter so a
            // notify_waiters between the check and the await is not lost.
            notified.as_mut().enable();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Everything owned by one run
///
/// The pending counter lives here, not on [`Core`]: a straggler from an
/// abandoned run settles its own run's counter and can never disturb the
/// accounting of a run started later.
struct RunHandle {
    fetch_tx: mpsc::UnboundedSender<Request>,
    cancel: CancellationToken,
    pending: PendingWork,
    fetch_driver: JoinHandle<()>,
    parse_driver: JoinHandle<()>,
}

struct Core {
    workers: usize,
    parser: Arc<dyn Parser>,
    transport: Arc<dyn Transport>,
    queue: RequestQueue,
    running: AtomicBool,
    run: Mutex<Option<RunHandle>>,
}

impl Core {
    fn run_slot(&self) -> MutexGuard<'_, Option<RunHandle>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn add_request(&self, request: Request) {
        self.queue.enqueue(request);
        if self.running() {
            self.dispatch_queued();
        }
    }

    /// Atomically drain the queue and hand every entry to the fetch stage
    ///
    /// Entries drained while the run is tearing down are put back so they
    /// survive for the next start().
    fn dispatch_queued(&self) {
        let drained = self.queue.drain_all();
        if drained.is_empty() {
            return;
        }
        let slot = self.run_slot();
        match slot.as_ref() {
            Some(run) => {
                for request in drained {
                    run.pending.dispatched();
                    if let Err(mpsc::error::SendError(request)) = run.fetch_tx.send(request) {
                        log::warn!("fetch stage gone, re-queueing {}", request.url());
                        run.pending.finished();
                        self.queue.enqueue(request);
                    }
                }
            }
            None => {
                for request in drained {
                    self.queue.enqueue(request);
                }
            }
        }
    }
}

/// Cheap cloneable handle passed to the parse callback
///
/// Exposes only what a callback legitimately needs: enqueueing child
/// requests and checking the run state.
#[derive(Clone)]
pub struct SpiderHandle {
    core: Arc<Core>,
}

impl SpiderHandle {
    /// Enqueue a request; dispatched immediately while the spider is running
    pub fn add_request(&self, request: Request) {
        self.core.add_request(request);
    }

    /// Convenience for [`add_request`](Self::add_request) with a bare URL
    pub fn add_url(&self, url: impl Into<String>) {
        self.core.add_request(Request::new(url));
    }

    pub fn running(&self) -> bool {
        self.core.running()
    }
}

/// The crawl orchestrator
///
/// Construct with [`Spider::new`] or [`Spider::builder`], queue requests with
/// [`add_request`](Spider::add_request), then [`start`](Spider::start) and
/// either [`wait`](Spider::wait) for a graceful drain or
/// [`stop`](Spider::stop) for a hard cancel.
pub struct Spider {
    core: Arc<Core>,
}

impl Spider {
    /// Create a spider with the default worker count and HTTP transport
    pub fn new(parser: impl Parser) -> Self {
        Self::builder(parser)
            .build()
            .expect("default configuration should be valid")
    }

    pub fn builder(parser: impl Parser) -> SpiderBuilder {
        SpiderBuilder::new(parser)
    }

    /// A handle suitable for enqueueing requests from other tasks
    pub fn handle(&self) -> SpiderHandle {
        SpiderHandle {
            core: self.core.clone(),
        }
    }

    /// Append a request to the work queue
    ///
    /// While idle the request waits for the next [`start`](Spider::start);
    /// while running it is dispatched at the next scheduling opportunity.
    /// Never blocks.
    pub fn add_request(&self, request: Request) {
        self.core.add_request(request);
    }

    /// Convenience for [`add_request`](Self::add_request) with a bare URL
    pub fn add_url(&self, url: impl Into<String>) {
        self.core.add_request(Request::new(url));
    }

    /// Number of requests queued and not yet dispatched
    pub fn queued(&self) -> usize {
        self.core.queue.len()
    }

    /// Transition to running and dispatch everything queued so far
    ///
    /// Spawns the pipeline stage drivers, so this must be called from within
    /// a tokio runtime. Calling `start` while already running is a no-op.
    pub fn start(&self) {
        if self.core.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let cancel = CancellationToken::new();
        let pending = PendingWork::new();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let fetch_driver = spawn_fetch_stage(
            self.core.workers,
            self.core.transport.clone(),
            pending.clone(),
            fetch_rx,
            done_tx,
            cancel.clone(),
        );
        let parse_driver = spawn_parse_stage(
            self.core.workers,
            self.core.parser.clone(),
            self.handle(),
            pending.clone(),
            done_rx,
            cancel.clone(),
        );

        *self.core.run_slot() = Some(RunHandle {
            fetch_tx,
            cancel,
            pending,
            fetch_driver,
            parse_driver,
        });

        self.core.dispatch_queued();
    }

    /// Block until all outstanding work, including work discovered during
    /// the wait, has drained; then transition back to idle
    ///
    /// Idempotent: returns immediately when the spider is already idle.
    pub async fn wait(&self) {
        let pending = match self.core.run_slot().as_ref() {
            Some(run) => run.pending.clone(),
            None => return,
        };

        pending.wait_idle().await;

        let run = self.core.run_slot().take();
        if let Some(run) = run {
            // Graceful path: closing the sender lets both stage streams end
            // on their own, draining anything already in the channels. The
            // cancellation token is reserved for stop().
            drop(run.fetch_tx);
            let _ = run.fetch_driver.await;
            let _ = run.parse_driver.await;
        }
        self.core.running.store(false, Ordering::SeqCst);
    }

    /// Hard cancel: abandon pending work and transition to idle without
    /// blocking
    ///
    /// Work already handed to a worker may still run to completion in the
    /// background; it is not awaited and its callbacks cannot re-enter
    /// dispatch. No new work is accepted until the next
    /// [`start`](Spider::start).
    pub fn stop(&self) {
        if !self.core.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(run) = self.core.run_slot().take() {
            run.cancel.cancel();
            run.pending.reset();
        }
    }

    /// Whether the spider is currently running
    pub fn running(&self) -> bool {
        self.core.running()
    }
}

fn spawn_fetch_stage(
    workers: usize,
    transport: Arc<dyn Transport>,
    pending: PendingWork,
    fetch_rx: mpsc::UnboundedReceiver<Request>,
    done_tx: mpsc::UnboundedSender<(Request, Response)>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        UnboundedReceiverStream::new(fetch_rx)
            .take_until(cancel.cancelled_owned())
            .for_each_concurrent(workers, move |request| {
                let transport = transport.clone();
                let done_tx = done_tx.clone();
                let pending = pending.clone();
                async move {
                    let response = transport.execute(&request).await;
                    if done_tx.send((request, response)).is_err() {
                        // Parse stage already tore down (stop() raced in);
                        // settle the counter for the abandoned item.
                        pending.finished();
                    }
                }
            })
            .await;
    })
}

fn spawn_parse_stage(
    workers: usize,
    parser: Arc<dyn Parser>,
    handle: SpiderHandle,
    pending: PendingWork,
    done_rx: mpsc::UnboundedReceiver<(Request, Response)>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        UnboundedReceiverStream::new(done_rx)
            .take_until(cancel.cancelled_owned())
            .for_each_concurrent(workers, move |(request, response)| {
                let parser = parser.clone();
                let handle = handle.clone();
                let pending = pending.clone();
                async move {
                    let url = request.url().to_string();
                    // One task per callback so a panic aborts only this work
                    // item, not the stage driver.
                    let invocation =
                        tokio::spawn(async move { parser.parse(handle, request, response).await });
                    if let Err(error) = invocation.await {
                        if error.is_panic() {
                            log::error!("parse callback for {url} panicked: {error}");
                        }
                    }
                    pending.finished();
                }
            })
            .await;
    })
}

/// Builder for configuring a [`Spider`]
pub struct SpiderBuilder {
    workers: usize,
    parser: Arc<dyn Parser>,
    transport: Option<Arc<dyn Transport>>,
}

impl SpiderBuilder {
    pub fn new(parser: impl Parser) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            parser: Arc::new(parser),
            transport: None,
        }
    }

    /// Set the worker-pool size shared by each pipeline stage (default: 8)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Replace the default HTTP transport
    ///
    /// Useful for tests and for render-capable transports.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Spider, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        Ok(Spider {
            core: Arc::new(Core {
                workers: self.workers,
                parser: self.parser,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HttpTransport::new())),
                queue: RequestQueue::new(),
                running: AtomicBool::new(false),
                run: Mutex::new(None),
            }),
        })
    }
}
