//! Notification client
//!
//! `NotificationClient` owns one logical connection to an [`Endpoint`]. A
//! single driver task executes the directives returned by [`Lifecycle`]:
//! connect, pump messages into the reaction, wait out the reconnect delay,
//! connect again. Because the driver is the only task that touches the
//! transport and the only one that sleeps, at most one reconnect timer can
//! ever be pending.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::endpoint::Endpoint;
use crate::errors::LiveReloadError;
use crate::event::LifecycleEvent;
use crate::lifecycle::{ConnectionState, Directive, Lifecycle};
use crate::notification::Notification;
use crate::policy::ReconnectPolicy;
use crate::reaction::{self, ReactionCallback};
use crate::transport::{Connection, Transport};

const EVENT_BUFFER: usize = 64;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// How a client finished
#[derive(Debug, Clone)]
pub enum ClientExit {
    /// `stop()` was called (or the client was dropped)
    Stopped,
    /// The reconnect budget ran out
    Exhausted { attempts: u32 },
    /// The transport failed with a non-transient error, e.g. a bad
    /// handshake header; retrying would fail the same way
    Aborted(LiveReloadError),
}

struct Shared {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    reaction: ReactionCallback,
    lifecycle: Mutex<Lifecycle>,
    events: broadcast::Sender<LifecycleEvent>,
    exit: watch::Sender<Option<ClientExit>>,
    cancel: CancellationToken,
    /// Cancelled once the driver task has exited
    done: CancellationToken,
}

/// Live-reload notification client
///
/// # Example
///
/// ```rust,no_run
/// use livereload_core::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example(transport: Arc<dyn Transport>) -> Result<(), LiveReloadError> {
/// let endpoint = Endpoint::from_page("http://localhost:4000/", "/ws")?;
/// let client = NotificationClient::new(
///     endpoint,
///     ReconnectPolicy::default(),
///     transport,
///     reaction_fn(|_| async { Ok(()) }),
/// )?;
///
/// client.start()?;
/// // ... later
/// client.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct NotificationClient {
    shared: Arc<Shared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationClient {
    /// Create a client in the `Idle` state
    pub fn new(
        endpoint: Endpoint,
        policy: ReconnectPolicy,
        transport: Arc<dyn Transport>,
        reaction: ReactionCallback,
    ) -> Result<Self, LiveReloadError> {
        policy.validate()?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (exit, _) = watch::channel(None);

        Ok(Self {
            shared: Arc::new(Shared {
                endpoint,
                transport,
                reaction,
                lifecycle: Mutex::new(Lifecycle::new(policy)),
                events,
                exit,
                cancel: CancellationToken::new(),
                done: CancellationToken::new(),
            }),
            driver: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lifecycle.lock().state()
    }

    /// Consecutive failed connections since the last successful open
    pub fn attempt(&self) -> u32 {
        self.shared.lifecycle.lock().attempt()
    }

    /// Subscribe to lifecycle events. Only events sent after this call are
    /// received, so subscribe before `start()` to see everything.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.shared.events.subscribe()
    }

    /// How the client finished, once it has
    pub fn exit(&self) -> Option<ClientExit> {
        Option::clone(&self.shared.exit.borrow())
    }

    /// `Idle -> Connecting`. Spawns the driver task and returns immediately;
    /// must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), LiveReloadError> {
        let directive = self.shared.lifecycle.lock().start()?;
        let Directive::Connect {
            generation,
            attempt,
        } = directive
        else {
            return Err(LiveReloadError::InternalError(format!(
                "unexpected directive on start: {directive:?}"
            )));
        };

        info!(
            endpoint = %self.shared.endpoint,
            transport = %self.shared.transport.info().name,
            "Starting notification client"
        );

        let shared = self.shared.clone();
        let handle = tokio::spawn(async move {
            let _done = shared.done.clone().drop_guard();
            let exit = shared.run(generation, attempt).await;
            shared.finish(exit);
        });
        *self.driver.lock() = Some(handle);

        Ok(())
    }

    /// Stop the client: cancel any pending reconnect, close the live
    /// connection and move to `Closed`. Safe to call any number of times.
    ///
    /// Every call returns only once the driver task has exited, so no timer
    /// outlives it.
    pub async fn stop(&self) {
        let (directive, never_started) = {
            let mut lifecycle = self.shared.lifecycle.lock();
            let never_started = lifecycle.state() == ConnectionState::Idle;
            (lifecycle.stop(), never_started)
        };

        if directive == Directive::Shutdown {
            info!(endpoint = %self.shared.endpoint, "Stopping notification client");
            self.shared.cancel.cancel();
            self.shared.emit(LifecycleEvent::Stopped);
            self.shared.finish(ClientExit::Stopped);
            if never_started {
                self.shared.done.cancel();
            }
        }

        let driver = self.driver.lock().take();
        if let Some(driver) = driver {
            if let Err(e) = driver.await {
                if e.is_panic() {
                    error!(error = %e, "Notification client driver panicked");
                }
            }
        }
        self.shared.done.cancelled().await;
    }

    /// Wait until the client finishes.
    ///
    /// Resolves `Ok(())` after `stop()`, `Err(ReconnectExhausted)` when the
    /// client gave up and the transport's own error when it aborted. Never
    /// resolves for a client that was not started.
    pub async fn wait(&self) -> Result<(), LiveReloadError> {
        let mut exit = self.shared.exit.subscribe();
        let outcome = {
            let current = exit
                .wait_for(Option::is_some)
                .await
                .map_err(|_| LiveReloadError::InternalError("client state dropped".to_string()))?;
            Option::clone(&current)
        };

        match outcome {
            Some(ClientExit::Exhausted { attempts }) => {
                Err(LiveReloadError::ReconnectExhausted { attempts })
            }
            Some(ClientExit::Aborted(error)) => Err(error),
            _ => Ok(()),
        }
    }
}

impl Drop for NotificationClient {
    fn drop(&mut self) {
        // connection and timers go away with the client
        self.shared.cancel.cancel();
    }
}

impl Shared {
    async fn run(&self, mut generation: u64, mut attempt: u32) -> ClientExit {
        let mut sequence = 0u64;

        loop {
            info!(endpoint = %self.endpoint, attempt, "Connecting to notification endpoint");
            self.emit(LifecycleEvent::Connecting { attempt });

            let connected = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return ClientExit::Stopped,
                result = self.transport.connect(&self.endpoint) => result,
            };

            let failure = match connected {
                Ok(mut connection) => {
                    let directive = self.lifecycle.lock().on_open(generation);
                    if directive != Directive::Proceed {
                        debug_log!(generation, "Discarding connection opened after stop");
                        close_quietly(connection.as_mut()).await;
                        return ClientExit::Stopped;
                    }

                    info!(endpoint = %self.endpoint, "Connected to notification endpoint");
                    self.emit(LifecycleEvent::Connected);

                    match self.pump(generation, connection.as_mut(), &mut sequence).await {
                        Some(failure) => {
                            if !failure.is_transient() {
                                close_quietly(connection.as_mut()).await;
                            }
                            failure
                        }
                        None => {
                            close_quietly(connection.as_mut()).await;
                            return ClientExit::Stopped;
                        }
                    }
                }
                Err(e) => e,
            };

            if !failure.is_transient() {
                let directive = self.lifecycle.lock().on_fatal(generation);
                if directive != Directive::Abort {
                    return ClientExit::Stopped;
                }

                error!(
                    endpoint = %self.endpoint,
                    error = %failure,
                    "Notification channel failed permanently, not reconnecting"
                );
                self.emit(LifecycleEvent::Aborted {
                    error: failure.to_string(),
                });
                return ClientExit::Aborted(failure);
            }
            let reason = failure.to_string();

            let directive = self.lifecycle.lock().on_close(generation);
            match directive {
                Directive::ScheduleReconnect {
                    delay,
                    attempt: next_attempt,
                    ..
                } => {
                    warn!(
                        endpoint = %self.endpoint,
                        reason = %reason,
                        attempt = next_attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Notification channel lost, reconnecting"
                    );
                    self.emit(LifecycleEvent::Disconnected { reason });
                    self.emit(LifecycleEvent::Reconnecting {
                        attempt: next_attempt,
                        delay,
                    });

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return ClientExit::Stopped,
                        _ = tokio::time::sleep(delay) => {}
                    }

                    let directive = self.lifecycle.lock().on_timer(generation);
                    match directive {
                        Directive::Connect {
                            generation: next_generation,
                            attempt: next_attempt,
                        } => {
                            generation = next_generation;
                            attempt = next_attempt;
                        }
                        _ => return ClientExit::Stopped,
                    }
                }
                Directive::GiveUp { attempts } => {
                    error!(
                        endpoint = %self.endpoint,
                        reason = %reason,
                        attempts,
                        "Giving up on notification channel: reconnect attempts exhausted"
                    );
                    self.emit(LifecycleEvent::Disconnected { reason });
                    self.emit(LifecycleEvent::GaveUp { attempts });
                    return ClientExit::Exhausted { attempts };
                }
                _ => return ClientExit::Stopped,
            }
        }
    }

    /// Dispatch messages until the connection ends (`Some(error)`) or the
    /// client is stopped (`None`).
    async fn pump(
        &self,
        generation: u64,
        connection: &mut dyn Connection,
        sequence: &mut u64,
    ) -> Option<LiveReloadError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                next = connection.next() => next,
            };

            let payload = match next {
                Some(Ok(payload)) => payload,
                Some(Err(e)) => return Some(e),
                None => {
                    return Some(LiveReloadError::ConnectionError(
                        "connection closed by server".to_string(),
                    ))
                }
            };

            let directive = self.lifecycle.lock().on_message(generation);
            if directive != Directive::Dispatch {
                return None;
            }

            *sequence += 1;
            let notification = Notification::new(*sequence, payload);
            trace_log!(
                sequence = notification.sequence(),
                bytes = notification.payload().len(),
                "Notification received"
            );

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                result = reaction::invoke(&self.reaction, notification) => result,
            };

            if let Err(e) = result {
                warn!(
                    sequence = *sequence,
                    error = %e,
                    "Reaction failed, connection stays open"
                );
                self.emit(LifecycleEvent::ReactionFailed {
                    sequence: *sequence,
                    error: e.to_string(),
                });
            }
        }
    }

    fn emit(&self, event: LifecycleEvent) {
        debug_log!(event = event.name(), "Lifecycle event");
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn finish(&self, exit: ClientExit) {
        self.exit.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(exit);
                true
            } else {
                false
            }
        });
    }
}

async fn close_quietly(connection: &mut dyn Connection) {
    match tokio::time::timeout(CLOSE_TIMEOUT, connection.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Failed to close notification connection gracefully"),
        Err(_) => warn!("Timed out closing notification connection"),
    }
}
