//! Connection lifecycle state machine
//!
//! `Lifecycle` is the single owner of [`ConnectionState`]. It performs no I/O:
//! every transition returns a [`Directive`] that the async driver in
//! [`crate::client`] carries out. Each connection attempt gets a new
//! generation number, and events carrying an old generation are ignored, so a
//! late open/close from a cancelled attempt can never move the state.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::errors::LiveReloadError;
use crate::policy::ReconnectPolicy;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectionState {
    /// Created, `start()` not called yet
    Idle,
    /// Transport connection in flight
    Connecting,
    /// Connected and receiving notifications
    Open,
    /// Terminal: stopped by the caller or out of reconnect attempts
    Closed,
    /// Connection lost, waiting for the reconnect timer
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Open a transport connection tagged with `generation`
    Connect { generation: u64, attempt: u32 },
    /// The connection is open; nothing else to do
    Proceed,
    /// Hand the received message to the reaction
    Dispatch,
    /// Arm the (single) reconnect timer
    ScheduleReconnect {
        generation: u64,
        delay: Duration,
        attempt: u32,
    },
    /// Stop: cancel the timer and close whatever connection is live
    Shutdown,
    /// Reconnect budget spent; the client is now closed
    GiveUp { attempts: u32 },
    /// Unrecoverable failure; the client is now closed
    Abort,
    /// Stale or redundant event, state unchanged
    Ignore,
}

/// Connection lifecycle for one client
#[derive(Debug, Clone)]
pub struct Lifecycle {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempt: u32,
    generation: u64,
    pending_timer: Option<u64>,
}

impl Lifecycle {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Idle,
            attempt: 0,
            generation: 0,
            pending_timer: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failed connections since the last successful open
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Generation of the current (or most recent) connection attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer.is_some()
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// `Idle -> Connecting`
    pub fn start(&mut self) -> Result<Directive, LiveReloadError> {
        match self.state {
            ConnectionState::Idle => Ok(self.begin_connect()),
            ConnectionState::Closed => Err(LiveReloadError::InvalidStateTransition {
                from: ConnectionState::Closed,
                event: "start",
            }),
            state => Err(LiveReloadError::AlreadyStarted(state)),
        }
    }

    /// `Connecting -> Open`, resets the attempt counter
    pub fn on_open(&mut self, generation: u64) -> Directive {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            return Directive::Ignore;
        }

        self.state = ConnectionState::Open;
        self.attempt = 0;
        Directive::Proceed
    }

    /// `Open -> Open`, message accepted for dispatch
    pub fn on_message(&mut self, generation: u64) -> Directive {
        if self.is_current(generation) && self.state == ConnectionState::Open {
            Directive::Dispatch
        } else {
            Directive::Ignore
        }
    }

    /// `Open | Connecting -> Failed` (or `Closed` once attempts are exhausted)
    pub fn on_close(&mut self, generation: u64) -> Directive {
        let live = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        );
        if !self.is_current(generation) || !live {
            return Directive::Ignore;
        }

        if self.policy.is_exhausted(self.attempt) {
            self.state = ConnectionState::Closed;
            self.pending_timer = None;
            return Directive::GiveUp {
                attempts: self.attempt,
            };
        }

        let delay = self.policy.delay(self.attempt);
        self.attempt += 1;
        self.state = ConnectionState::Failed;
        self.pending_timer = Some(generation);

        Directive::ScheduleReconnect {
            generation,
            delay,
            attempt: self.attempt,
        }
    }

    /// `Open | Connecting -> Closed` for a failure reconnecting cannot fix
    pub fn on_fatal(&mut self, generation: u64) -> Directive {
        let live = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        );
        if !self.is_current(generation) || !live {
            return Directive::Ignore;
        }

        self.state = ConnectionState::Closed;
        self.pending_timer = None;
        Directive::Abort
    }

    /// `Failed -> Connecting` when the pending timer fires
    pub fn on_timer(&mut self, generation: u64) -> Directive {
        if self.pending_timer != Some(generation) || self.state != ConnectionState::Failed {
            return Directive::Ignore;
        }

        self.pending_timer = None;
        self.begin_connect()
    }

    /// `* -> Closed`. Idempotent: only the first call yields `Shutdown`.
    pub fn stop(&mut self) -> Directive {
        if self.state == ConnectionState::Closed {
            return Directive::Ignore;
        }

        self.state = ConnectionState::Closed;
        self.pending_timer = None;
        Directive::Shutdown
    }

    fn begin_connect(&mut self) -> Directive {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        Directive::Connect {
            generation: self.generation,
            attempt: self.attempt,
        }
    }

    #[inline]
    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}
