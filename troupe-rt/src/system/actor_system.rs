//! The actor system: root supervisor and orderly shutdown.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::{Condvar, Mutex};

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::SystemError;
use super::signals;
use crate::actor::{Actor, ActorContext, ActorError, ActorRef, SendError};
use crate::actor::{ActorCell, CellSettings};
use crate::message::{Message, MessageType, STOP, STOPPED};
use crate::monitoring::{Monitor, NoopMonitor, RuntimeEvent, RuntimeEventKind};
use crate::scheduler::{Dispatcher, WorkerSettings};

/// Tick of the shutdown wait loop; signal flags are polled at this interval.
const WAIT_TICK: Duration = Duration::from_secs(1);

/// Flags and condvar coordinating the wait-for-children loop.
struct SystemShared {
    /// Set by the root's `on_stop`; terminates the wait loop.
    stop: AtomicBool,
    /// Graceful-shutdown request (signal or programmatic).
    stop_children: AtomicBool,
    /// Gate making the Stop broadcast idempotent across repeat requests.
    stop_children_done: AtomicBool,
    wait_lock: Mutex<()>,
    wait_cond: Condvar,
}

impl SystemShared {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            stop_children: AtomicBool::new(false),
            stop_children_done: AtomicBool::new(false),
            wait_lock: Mutex::new(()),
            wait_cond: Condvar::new(),
        }
    }

    fn notify(&self) {
        let _guard = self.wait_lock.lock();
        self.wait_cond.notify_all();
    }
}

/// Behavior of the root supervisor cell.
///
/// Counts departing children and stops itself when the last one is gone;
/// its `on_stop` releases the wait loop.
struct SystemActor {
    shared: Arc<SystemShared>,
}

impl Actor for SystemActor {
    fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        if msg.is(&STOPPED) && ctx.num_children() == 0 {
            ctx.stop_self();
        }
        Ok(())
    }

    fn on_stop(&mut self, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        let _guard = self.shared.wait_lock.lock();
        self.shared.stop.store(true, Ordering::Release);
        self.shared.wait_cond.notify_all();
        Ok(())
    }
}

/// The top-level handle to a running actor runtime.
///
/// Owns the worker pool and the root supervisor cell (named `"System"`).
/// Actors spawned through [`ActorSystem::spawn`] become children of the
/// root; stopping the system stops them first, depth-first, before the
/// root itself goes down and [`ActorSystem::wait_children`] returns.
///
/// # Examples
///
/// ```rust,no_run
/// use troupe_rt::actor::{Actor, ActorContext, ActorError};
/// use troupe_rt::message::Message;
/// use troupe_rt::system::{ActorSystem, SystemConfig};
///
/// struct Quiet;
///
/// impl Actor for Quiet {
///     fn on_receive(
///         &mut self,
///         _msg: &Message,
///         _ctx: &mut ActorContext<'_>,
///     ) -> Result<(), ActorError> {
///         Ok(())
///     }
/// }
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SystemConfig::builder().with_num_workers(2).build()?;
///     let system = ActorSystem::new(config)?;
///     let _quiet = system.spawn("Quiet", Quiet)?;
///
///     system.request_shutdown();
///     system.wait_children()?;
///     Ok(())
/// }
/// ```
pub struct ActorSystem {
    dispatcher: Arc<Dispatcher>,
    root: Arc<ActorCell>,
    shared: Arc<SystemShared>,
    monitor: Arc<dyn Monitor>,
    signals_installed: bool,
}

impl ActorSystem {
    /// Create a system with the default (no-op) monitor.
    ///
    /// Starts `config.num_workers` worker threads and, unless disabled in
    /// the configuration, installs SIGINT/SIGTERM handlers that request
    /// graceful shutdown.
    pub fn new(config: SystemConfig) -> Result<Self, SystemError> {
        Self::with_monitor(config, Arc::new(NoopMonitor))
    }

    /// Create a system recording runtime events into `monitor`.
    pub fn with_monitor(
        config: SystemConfig,
        monitor: Arc<dyn Monitor>,
    ) -> Result<Self, SystemError> {
        config.validate().map_err(SystemError::ConfigError)?;

        let dispatcher = Dispatcher::new(
            config.num_workers,
            WorkerSettings {
                runqueue_capacity: config.runqueue_capacity,
                throughput: config.throughput,
                throughput_deadline: config.throughput_deadline,
            },
            Arc::clone(&monitor),
        )
        .map_err(|err| SystemError::WorkerPoolFailed(err.to_string()))?;

        let shared = Arc::new(SystemShared::new());
        let root = ActorCell::create(
            None,
            "System",
            Box::new(SystemActor {
                shared: Arc::clone(&shared),
            }),
            Arc::clone(&dispatcher),
            Arc::clone(&monitor),
            CellSettings {
                mailbox_capacity: config.mailbox_capacity,
                default_affinity: config.default_affinity,
            },
        )?;

        if config.install_signal_handlers {
            signals::install()?;
        }

        Ok(Self {
            dispatcher,
            root,
            shared,
            monitor,
            signals_installed: config.install_signal_handlers,
        })
    }

    /// Spawn a top-level actor as a child of the root supervisor.
    ///
    /// `Start` is delivered asynchronously before any other message. Fails
    /// with [`SystemError::ShuttingDown`] once shutdown has been requested.
    pub fn spawn(
        &self,
        name: impl Into<String>,
        actor: impl Actor,
    ) -> Result<ActorRef, SystemError> {
        if self.is_shutting_down() {
            return Err(SystemError::ShuttingDown);
        }
        let cell = self.root.spawn_child(name, Box::new(actor))?;
        Ok(ActorRef::from_cell(&cell))
    }

    /// Send a message of external origin (no sending actor) to `to`.
    pub fn send(
        &self,
        to: &ActorRef,
        message_type: &'static MessageType,
        payload: Option<Box<dyn Any + Send>>,
    ) -> Result<(), SendError> {
        to.deliver(None, message_type, payload)
    }

    /// Handle to the root supervisor cell.
    pub fn root(&self) -> ActorRef {
        ActorRef::from_cell(&self.root)
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.dispatcher.num_workers()
    }

    /// True once graceful shutdown has been requested or completed.
    pub fn is_shutting_down(&self) -> bool {
        self.shared.stop_children.load(Ordering::Acquire) || self.shared.stop.load(Ordering::Acquire)
    }

    /// Request graceful shutdown, as if a SIGTERM had arrived.
    ///
    /// Idempotent. The actual Stop broadcast happens on the wait loop.
    pub fn request_shutdown(&self) {
        self.monitor
            .record(RuntimeEvent::new(RuntimeEventKind::ShutdownRequested));
        self.shared.stop_children.store(true, Ordering::Release);
        self.shared.notify();
    }

    /// Block until the system has shut down, then tear it down.
    ///
    /// The loop wakes on each tick (or notification) and, the first time a
    /// shutdown request is seen, broadcasts `Stop` to the root's children.
    /// The root stops itself once its last child is gone; its `on_stop`
    /// releases this loop. The system also shuts down without an explicit
    /// request when its last top-level actor terminates on its own.
    ///
    /// On return every worker thread has been joined and every cell
    /// released.
    pub fn wait_children(self) -> Result<(), SystemError> {
        while !self.shared.stop.load(Ordering::Acquire) {
            if self.signals_installed && signals::take_shutdown_request() {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::ShutdownRequested));
                self.shared.stop_children.store(true, Ordering::Release);
            }

            if self.shared.stop_children.load(Ordering::Acquire)
                && !self.shared.stop_children_done.load(Ordering::Acquire)
            {
                self.stop_root_children();
                self.shared.stop_children_done.store(true, Ordering::Release);
            }

            let mut guard = self.shared.wait_lock.lock();
            if !self.shared.stop.load(Ordering::Acquire) {
                let _ = self.shared.wait_cond.wait_for(&mut guard, WAIT_TICK);
            }
        }

        self.dispatcher.shutdown();
        Ok(())
    }

    /// Broadcast `Stop` to every top-level actor; with none left, stop the
    /// root directly so the wait loop still terminates.
    fn stop_root_children(&self) {
        let children = self.root.children_snapshot();

        if children.is_empty() {
            if self.root.deliver(None, &STOP, None).is_err() {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::MessageDropped {
                        actor: self.root.name().to_string(),
                        message_type: STOP.name(),
                    }));
            }
            return;
        }

        let from = ActorRef::from_cell(&self.root);
        for child in children {
            if child
                .deliver(Some(from.clone()), &STOP, None)
                .is_err()
            {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::MessageDropped {
                        actor: child.name().to_string(),
                        message_type: STOP.name(),
                    }));
            }
        }
    }
}

impl Drop for ActorSystem {
    fn drop(&mut self) {
        self.dispatcher.shutdown();
    }
}

impl std::fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorSystem")
            .field("workers", &self.num_workers())
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests are allowed to use unwrap for simplicity
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::monitoring::InMemoryMonitor;
    use parking_lot::Mutex as PlMutex;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Instant;

    static PING: MessageType = MessageType::new("Ping");
    static PONG: MessageType = MessageType::new("Pong");
    static RECORD: MessageType = MessageType::new("Record");
    static COUNT: MessageType = MessageType::new("Count");
    static PROBE: MessageType = MessageType::new("Probe");
    static BUSY: MessageType = MessageType::new("Busy");
    static POKE: MessageType = MessageType::new("Poke");
    static BOOM: MessageType = MessageType::new("Boom");

    fn test_config(num_workers: usize) -> SystemConfig {
        SystemConfig::builder()
            .with_num_workers(num_workers)
            .with_signal_handlers(false)
            .build()
            .unwrap()
    }

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let limit = Instant::now() + deadline;
        while Instant::now() < limit {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    fn stopped_count(monitor: &InMemoryMonitor, name: &str) -> usize {
        monitor
            .events()
            .iter()
            .filter(|e| matches!(&e.kind, RuntimeEventKind::ActorStopped { actor } if actor == name))
            .count()
    }

    fn started_count(monitor: &InMemoryMonitor, name: &str) -> usize {
        monitor
            .events()
            .iter()
            .filter(|e| matches!(&e.kind, RuntimeEventKind::ActorStarted { actor } if actor == name))
            .count()
    }

    fn scheduled_count(monitor: &InMemoryMonitor, name: &str) -> usize {
        monitor
            .events()
            .iter()
            .filter(
                |e| matches!(&e.kind, RuntimeEventKind::ActorScheduled { actor, .. } if actor == name),
            )
            .count()
    }

    // ------------------------------------------------------------------
    // Ping-pong demo actors
    // ------------------------------------------------------------------

    #[derive(Debug, PartialEq)]
    struct Ping {
        num: u32,
    }

    #[derive(Debug, PartialEq)]
    struct Pong {
        num: u32,
    }

    struct Pinger {
        max_pings: u32,
        num_pongers: usize,
        num_pings: u32,
        curr_ponger: usize,
        pongers: Vec<Option<ActorRef>>,
    }

    impl Pinger {
        fn new(max_pings: u32, num_pongers: usize) -> Self {
            Self {
                max_pings,
                num_pongers,
                num_pings: 0,
                curr_ponger: 0,
                pongers: Vec::new(),
            }
        }
    }

    impl Actor for Pinger {
        fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            for i in 0..self.num_pongers {
                let ponger = ctx.spawn_child(format!("Ponger-{i}"), Ponger)?;
                ctx.send(&ponger, &PING, Some(Box::new(Ping { num: 0 })))?;
                self.pongers.push(Some(ponger));
            }
            Ok(())
        }

        fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&PONG) {
                if self.num_pings >= self.max_pings {
                    ctx.stop_self();
                    return Ok(());
                }
                self.num_pings += 1;

                loop {
                    self.curr_ponger = (self.curr_ponger + 1) % self.pongers.len();
                    if self.pongers[self.curr_ponger].is_some() {
                        break;
                    }
                }
                if let Some(ponger) = &self.pongers[self.curr_ponger] {
                    ctx.send(
                        ponger,
                        &PING,
                        Some(Box::new(Ping {
                            num: self.num_pings,
                        })),
                    )?;
                }
            } else if msg.is(&STOPPED) {
                if let Some(sender) = msg.sender() {
                    for slot in &mut self.pongers {
                        if slot.as_ref() == Some(sender) {
                            *slot = None;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct Ponger;

    impl Actor for Ponger {
        fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&PING) {
                if let (Some(ping), Some(sender)) = (msg.payload::<Ping>(), msg.sender()) {
                    ctx.send(sender, &PONG, Some(Box::new(Pong { num: ping.num })))?;
                }
            }
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // End-to-end scenarios
    // ------------------------------------------------------------------

    #[test]
    fn ping_pong_with_termination() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let _pinger = system.spawn("Pinger", Pinger::new(10, 1)).unwrap();

        // Pinger stops itself after 10 pongs; the cascade reaches the root.
        system.wait_children().unwrap();

        assert_eq!(started_count(&monitor, "Pinger"), 1);
        assert_eq!(started_count(&monitor, "Ponger-0"), 1);
        assert_eq!(stopped_count(&monitor, "Ponger-0"), 1);
        assert_eq!(stopped_count(&monitor, "Pinger"), 1);
        assert_eq!(stopped_count(&monitor, "System"), 1);

        // Every non-root cell was reaped by its parent exactly once.
        let events = monitor.events();
        let reaps: Vec<(String, String)> = events
            .iter()
            .filter_map(|e| match &e.kind {
                RuntimeEventKind::ChildReaped { parent, child } => {
                    Some((parent.clone(), child.clone()))
                }
                _ => None,
            })
            .collect();
        assert!(reaps.contains(&("Pinger".to_string(), "Ponger-0".to_string())));
        assert!(reaps.contains(&("System".to_string(), "Pinger".to_string())));
    }

    struct Recorder {
        log: Arc<PlMutex<Vec<u32>>>,
    }

    impl Actor for Recorder {
        fn on_receive(&mut self, msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&RECORD) {
                if let Some(num) = msg.payload::<u32>() {
                    self.log.lock().push(*num);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn per_pair_fifo_order() {
        let system = ActorSystem::new(test_config(2)).unwrap();
        let log = Arc::new(PlMutex::new(Vec::new()));
        let recorder = system
            .spawn(
                "Recorder",
                Recorder {
                    log: Arc::clone(&log),
                },
            )
            .unwrap();

        for num in 1..=3u32 {
            system.send(&recorder, &RECORD, Some(Box::new(num))).unwrap();
        }

        assert!(wait_until(Duration::from_secs(10), || log.lock().len() == 3));
        assert_eq!(*log.lock(), vec![1, 2, 3]);

        system.request_shutdown();
        system.wait_children().unwrap();
    }

    struct Counter {
        seen: Arc<AtomicUsize>,
    }

    impl Actor for Counter {
        fn on_receive(&mut self, msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&COUNT) {
                self.seen.fetch_add(1, Ordering::AcqRel);
            }
            Ok(())
        }
    }

    #[test]
    fn throughput_bounds_each_visit() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let config = SystemConfig::builder()
            .with_num_workers(1)
            .with_throughput(4)
            .with_signal_handlers(false)
            .build()
            .unwrap();
        let system = ActorSystem::with_monitor(config, Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = system
            .spawn(
                "Counter",
                Counter {
                    seen: Arc::clone(&seen),
                },
            )
            .unwrap();

        for _ in 0..100 {
            system.send(&counter, &COUNT, None).unwrap();
        }

        assert!(wait_until(Duration::from_secs(10), || {
            seen.load(Ordering::Acquire) == 100
        }));

        // 100 messages at <= 4 per visit: the cell went through the
        // set-idle / re-dispatch handshake at least 25 times.
        assert!(scheduled_count(&monitor, "Counter") >= 25);

        system.request_shutdown();
        system.wait_children().unwrap();
    }

    #[test]
    fn tiny_deadline_processes_one_message_per_visit() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let config = SystemConfig::builder()
            .with_num_workers(1)
            .with_throughput(8)
            .with_throughput_deadline(Some(Duration::from_nanos(1)))
            .with_signal_handlers(false)
            .build()
            .unwrap();
        let system = ActorSystem::with_monitor(config, Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = system
            .spawn(
                "Counter",
                Counter {
                    seen: Arc::clone(&seen),
                },
            )
            .unwrap();

        for _ in 0..10 {
            system.send(&counter, &COUNT, None).unwrap();
        }

        assert!(wait_until(Duration::from_secs(10), || {
            seen.load(Ordering::Acquire) == 10
        }));

        // Deadline expires after the first message of nearly every visit,
        // so the 10 deliveries took far more visits than the two or three
        // that throughput=8 batching alone would need.
        assert!(scheduled_count(&monitor, "Counter") >= 8);

        system.request_shutdown();
        system.wait_children().unwrap();
    }

    struct Parent {
        num_children: usize,
    }

    impl Actor for Parent {
        fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            for i in 0..self.num_children {
                ctx.spawn_child(format!("c{i}"), Inert)?;
            }
            Ok(())
        }

        fn on_receive(&mut self, _msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            Ok(())
        }
    }

    struct Inert;

    impl Actor for Inert {
        fn on_receive(&mut self, _msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            Ok(())
        }
    }

    #[test]
    fn sibling_stop_is_complete() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let parent = system.spawn("Parent", Parent { num_children: 5 }).unwrap();

        assert!(wait_until(Duration::from_secs(10), || {
            (0..5).all(|i| started_count(&monitor, &format!("c{i}")) == 1)
        }));

        system.send(&parent, &STOP, None).unwrap();
        system.wait_children().unwrap();

        // Order across siblings is unspecified, but the set is exact.
        for i in 0..5 {
            assert_eq!(stopped_count(&monitor, &format!("c{i}")), 1);
        }
        assert_eq!(stopped_count(&monitor, "Parent"), 1);
    }

    #[test]
    fn affinity_keeps_cell_on_first_worker() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let echo = system
            .spawn(
                "Echo",
                Counter {
                    seen: Arc::clone(&seen),
                },
            )
            .unwrap();

        // Gaps between bursts force idle -> re-dispatch transitions.
        for burst in 0..20 {
            for _ in 0..5 {
                system.send(&echo, &COUNT, None).unwrap();
            }
            if burst % 4 == 0 {
                thread::sleep(Duration::from_millis(2));
            }
        }

        assert!(wait_until(Duration::from_secs(10), || {
            seen.load(Ordering::Acquire) == 100
        }));

        let workers: Vec<usize> = monitor
            .events()
            .iter()
            .filter_map(|e| match &e.kind {
                RuntimeEventKind::ActorScheduled { actor, worker } if actor == "Echo" => {
                    Some(*worker)
                }
                _ => None,
            })
            .collect();
        assert!(workers.len() >= 2);
        assert!(workers.iter().all(|w| *w == workers[0]));

        system.request_shutdown();
        system.wait_children().unwrap();
    }

    // ------------------------------------------------------------------
    // Lifecycle properties
    // ------------------------------------------------------------------

    struct EagerQuitter;

    impl Actor for EagerQuitter {
        fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            ctx.stop_self();
            Ok(())
        }

        fn on_receive(&mut self, _msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            Ok(())
        }
    }

    #[test]
    fn root_stops_when_children_reach_zero() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        // Spawn all three before any of them can terminate, so the child
        // count cannot dip to zero prematurely.
        let quitters: Vec<ActorRef> = (0..3)
            .map(|i| system.spawn(format!("quitter-{i}"), TripleStopper).unwrap())
            .collect();
        for quitter in &quitters {
            system.send(quitter, &POKE, None).unwrap();
        }

        // No shutdown request: the root stops on its own when the count of
        // its living children reaches zero.
        system.wait_children().unwrap();

        for i in 0..3 {
            assert_eq!(stopped_count(&monitor, &format!("quitter-{i}")), 1);
        }

        // The root began stopping only after its third child was reaped.
        let events = monitor.events();
        let last_reap = events
            .iter()
            .rposition(|e| matches!(&e.kind, RuntimeEventKind::ChildReaped { parent, .. } if parent == "System"))
            .unwrap();
        let root_stopping = events
            .iter()
            .position(|e| matches!(&e.kind, RuntimeEventKind::ActorStopping { actor } if actor == "System"))
            .unwrap();
        assert!(root_stopping > last_reap);
    }

    struct TripleStopper;

    impl Actor for TripleStopper {
        fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&POKE) {
                ctx.stop_self();
                ctx.stop_self();
                ctx.stop_self();
            }
            Ok(())
        }
    }

    #[test]
    fn stop_self_is_idempotent() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let actor = system.spawn("Triple", TripleStopper).unwrap();
        system.send(&actor, &POKE, None).unwrap();

        system.wait_children().unwrap();

        let stopping = monitor
            .events()
            .iter()
            .filter(|e| matches!(&e.kind, RuntimeEventKind::ActorStopping { actor } if actor == "Triple"))
            .count();
        assert_eq!(stopping, 1);
        assert_eq!(stopped_count(&monitor, "Triple"), 1);
    }

    struct SlowParent;

    impl Actor for SlowParent {
        fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            let child = ctx.spawn_child("snail", Snail)?;
            for _ in 0..300 {
                ctx.send(&child, &BUSY, None)?;
            }
            Ok(())
        }

        fn on_receive(&mut self, _msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            Ok(())
        }
    }

    struct Snail;

    impl Actor for Snail {
        fn on_receive(&mut self, msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&BUSY) {
                thread::sleep(Duration::from_micros(50));
            }
            Ok(())
        }
    }

    #[test]
    fn repeat_stop_while_stopping_is_noop() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let parent = system.spawn("SlowParent", SlowParent).unwrap();
        assert!(wait_until(Duration::from_secs(10), || {
            started_count(&monitor, "snail") == 1
        }));

        // The child's long backlog keeps the parent in Stopping while the
        // second Stop arrives.
        system.send(&parent, &STOP, None).unwrap();
        system.send(&parent, &STOP, None).unwrap();

        system.wait_children().unwrap();

        let stopping = monitor
            .events()
            .iter()
            .filter(|e| matches!(&e.kind, RuntimeEventKind::ActorStopping { actor } if actor == "SlowParent"))
            .count();
        assert_eq!(stopping, 1);
        assert_eq!(stopped_count(&monitor, "snail"), 1);
        assert_eq!(stopped_count(&monitor, "SlowParent"), 1);
    }

    struct ProbeRecorder {
        saw_probe: Arc<AtomicBool>,
    }

    impl Actor for ProbeRecorder {
        fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            let child = ctx.spawn_child("ballast", Snail)?;
            for _ in 0..300 {
                ctx.send(&child, &BUSY, None)?;
            }
            Ok(())
        }

        fn on_receive(&mut self, msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&PROBE) {
                self.saw_probe.store(true, Ordering::Release);
            }
            Ok(())
        }
    }

    #[test]
    fn user_messages_are_dropped_while_stopping() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let saw_probe = Arc::new(AtomicBool::new(false));
        let actor = system
            .spawn(
                "Prober",
                ProbeRecorder {
                    saw_probe: Arc::clone(&saw_probe),
                },
            )
            .unwrap();

        assert!(wait_until(Duration::from_secs(10), || {
            started_count(&monitor, "ballast") == 1
        }));

        // FIFO from this thread: Stop is processed before Probe, and the
        // busy child keeps the actor in Stopping when Probe arrives.
        system.send(&actor, &STOP, None).unwrap();
        system.send(&actor, &PROBE, None).unwrap();

        system.wait_children().unwrap();

        assert!(!saw_probe.load(Ordering::Acquire));
        let dropped = monitor.events().iter().any(|e| {
            matches!(
                &e.kind,
                RuntimeEventKind::MessageDropped { actor, message_type }
                    if actor == "Prober" && *message_type == "Probe"
            )
        });
        assert!(dropped);
    }

    struct Faulty;

    impl Actor for Faulty {
        fn on_receive(&mut self, msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            if msg.is(&BOOM) {
                return Err("intentional failure".into());
            }
            Ok(())
        }
    }

    #[test]
    fn handler_failure_stops_the_actor() {
        let monitor = Arc::new(InMemoryMonitor::new());
        let system = ActorSystem::with_monitor(test_config(2), Arc::clone(&monitor) as Arc<dyn Monitor>).unwrap();

        let actor = system.spawn("Faulty", Faulty).unwrap();
        system.send(&actor, &BOOM, None).unwrap();

        // The fault latches a stop; with no other children the root follows.
        system.wait_children().unwrap();

        let failed = monitor.events().iter().any(|e| {
            matches!(
                &e.kind,
                RuntimeEventKind::HandlerFailed { actor, error }
                    if actor == "Faulty" && error.contains("intentional")
            )
        });
        assert!(failed);
        assert_eq!(stopped_count(&monitor, "Faulty"), 1);
    }

    struct LateSpawner {
        spawn_refused: Arc<AtomicBool>,
    }

    impl Actor for LateSpawner {
        fn on_receive(&mut self, _msg: &Message, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            Ok(())
        }

        fn on_stop(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
            let refused = ctx.spawn_child("too-late", Inert).is_err();
            self.spawn_refused.store(refused, Ordering::Release);
            Ok(())
        }
    }

    #[test]
    fn spawning_from_a_stopping_actor_is_refused() {
        let system = ActorSystem::new(test_config(2)).unwrap();

        let spawn_refused = Arc::new(AtomicBool::new(false));
        let actor = system
            .spawn(
                "Late",
                LateSpawner {
                    spawn_refused: Arc::clone(&spawn_refused),
                },
            )
            .unwrap();

        system.send(&actor, &STOP, None).unwrap();
        system.wait_children().unwrap();

        assert!(spawn_refused.load(Ordering::Acquire));
    }

    #[test]
    fn spawn_after_shutdown_request_is_refused() {
        let system = ActorSystem::new(test_config(2)).unwrap();
        let _keeper = system.spawn("Keeper", Inert).unwrap();

        system.request_shutdown();
        let result = system.spawn("straggler", Inert);
        assert!(matches!(result, Err(SystemError::ShuttingDown)));

        system.wait_children().unwrap();
    }

    #[test]
    fn refs_are_dead_after_shutdown() {
        let system = ActorSystem::new(test_config(2)).unwrap();
        let actor = system.spawn("Transient", Inert).unwrap();
        assert!(actor.is_alive());

        system.request_shutdown();
        system.wait_children().unwrap();

        assert!(!actor.is_alive());
    }

    #[test]
    fn send_to_stopped_actor_fails() {
        let system = ActorSystem::new(test_config(2)).unwrap();
        let _keeper = system.spawn("Keeper2", Inert).unwrap();
        let quitter = system.spawn("EarlyQuit", EagerQuitter).unwrap();

        assert!(wait_until(Duration::from_secs(10), || !quitter.is_alive()));

        let result = system.send(&quitter, &COUNT, None);
        assert!(matches!(result, Err(SendError::ActorStopped { .. })));

        system.request_shutdown();
        system.wait_children().unwrap();
    }

    #[test]
    fn shutdown_with_no_children_completes() {
        let system = ActorSystem::new(test_config(1)).unwrap();
        system.request_shutdown();
        system.wait_children().unwrap();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SystemConfig {
            num_workers: 0,
            ..SystemConfig::default()
        };
        let result = ActorSystem::new(config);
        assert!(matches!(result, Err(SystemError::ConfigError(_))));
    }
}
