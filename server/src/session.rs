//! Session registry: connection lifecycle and per-player input queuing
//!
//! Each connected identity owns exactly one session holding its network
//! address, liveness timestamp, and a FIFO queue of inputs awaiting the next
//! simulation tick. The queue grows only on packet receipt and shrinks only
//! when the tick drains it; both happen on the main server loop, strictly
//! serialized, so no finer locking is needed.
//!
//! The registry is owned by the server and handed to the handlers that need
//! it; there is no process-wide player table.

use log::info;
use shared::InputCommand;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// How long a session may stay silent before it is reaped.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// A connected identity and its buffered, not-yet-simulated inputs.
#[derive(Debug)]
pub struct Session {
    /// Opaque session identifier, echoed to the client at connect.
    pub id: u32,
    /// Opaque user identifier from the identity provider.
    pub user_id: String,
    /// Network address for response routing.
    pub addr: SocketAddr,
    /// Last time any packet arrived from this session.
    pub last_seen: Instant,
    /// Inputs waiting for the next tick, in arrival order.
    pub moves: VecDeque<InputCommand>,
}

impl Session {
    pub fn new(id: u32, user_id: String, addr: SocketAddr) -> Self {
        Self {
            id,
            user_id,
            addr,
            last_seen: Instant::now(),
            moves: VecDeque::new(),
        }
    }

    /// Appends an input to the back of the queue and refreshes liveness.
    /// Arrival order is preserved; inputs are never reordered.
    pub fn push_input(&mut self, command: InputCommand) {
        self.last_seen = Instant::now();
        self.moves.push_back(command);
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// All live sessions, keyed by user id, with a capacity limit.
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    next_session_id: u32,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
        }
    }

    /// Registers a session for `user_id`, returning its session id, or None
    /// when the server is full. A user reconnecting while their old session
    /// is still live must be removed first; this refuses duplicates.
    pub fn add_session(&mut self, user_id: &str, addr: SocketAddr) -> Option<u32> {
        if self.sessions.len() >= self.max_sessions || self.sessions.contains_key(user_id) {
            return None;
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!("User {} connected from {}", user_id, addr);
        self.sessions
            .insert(user_id.to_string(), Session::new(session_id, user_id.to_string(), addr));

        Some(session_id)
    }

    /// Removes a session. Returns true if it existed.
    pub fn remove_session(&mut self, user_id: &str) -> bool {
        if self.sessions.remove(user_id).is_some() {
            info!("User {} disconnected", user_id);
            true
        } else {
            false
        }
    }

    /// Resolves the user id bound to a network address. Incoming packets are
    /// trusted only as far as the session their source address belongs to.
    pub fn find_user_by_addr(&self, addr: SocketAddr) -> Option<String> {
        self.sessions
            .iter()
            .find(|(_, session)| session.addr == addr)
            .map(|(user_id, _)| user_id.clone())
    }

    /// Queues an input for a user. Returns false for unknown users.
    pub fn push_input(&mut self, user_id: &str, command: InputCommand) -> bool {
        if let Some(session) = self.sessions.get_mut(user_id) {
            session.push_input(command);
            true
        } else {
            false
        }
    }

    /// Mutable access to every session, for the tick drain.
    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Removes sessions that have gone silent and returns their user ids so
    /// the simulation can drop the corresponding players.
    pub fn check_timeouts(&mut self) -> Vec<String> {
        let timed_out: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_timed_out(SESSION_TIMEOUT))
            .map(|(user_id, _)| user_id.clone())
            .collect();

        for user_id in &timed_out {
            self.remove_session(user_id);
        }

        timed_out
    }

    /// All session addresses, for snapshot broadcasting.
    pub fn addrs(&self) -> Vec<SocketAddr> {
        self.sessions.values().map(|session| session.addr).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
