// Connection sessions and per-connection event delivery.

use super::types::{ArenaEvent, Audience, Dispatch, Outbound};
use crate::domain::PlayerId;
use std::collections::HashMap;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    // Registered, bootstrap not yet delivered.
    Connecting,
    // Receives broadcasts.
    Active,
    // Terminal.
    Disconnected,
}

#[derive(Debug)]
pub struct Session {
    outbound: Outbound,
    phase: SessionPhase,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}

/// Live sessions keyed by player id. Each session has exactly one ordered queue,
/// so per-connection delivery order is the order the world task issued events.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn phase(&self, player_id: PlayerId) -> Option<SessionPhase> {
        self.sessions.get(&player_id).map(Session::phase)
    }

    pub fn register(&mut self, player_id: PlayerId, outbound: Outbound) {
        self.sessions.insert(
            player_id,
            Session {
                outbound,
                phase: SessionPhase::Connecting,
            },
        );
    }

    pub fn activate(&mut self, player_id: PlayerId) {
        if let Some(session) = self.sessions.get_mut(&player_id) {
            session.phase = SessionPhase::Active;
        }
    }

    /// Drops the session; the returned value is already in its terminal phase.
    pub fn close(&mut self, player_id: PlayerId) -> Option<Session> {
        self.sessions.remove(&player_id).map(|mut session| {
            session.phase = SessionPhase::Disconnected;
            session
        })
    }

    /// Fire-and-forget delivery. `Only` reaches any live session (that is how the
    /// bootstrap arrives); broadcasts reach active sessions only.
    ///
    /// A session whose queue is full is dropped. Closing its queue ends the socket
    /// task, and that task's leave event removes the player.
    pub fn deliver(&mut self, dispatch: Dispatch) {
        let Dispatch { audience, event } = dispatch;
        let mut overflowed = Vec::new();
        match audience {
            Audience::Only(player_id) => {
                if let Some(session) = self.sessions.get(&player_id) {
                    if !send(player_id, session, event) {
                        overflowed.push(player_id);
                    }
                }
            }
            Audience::AllExcept(_) | Audience::All => {
                for (&player_id, session) in &self.sessions {
                    if session.phase == SessionPhase::Active
                        && audience.includes(player_id)
                        && !send(player_id, session, event.clone())
                    {
                        overflowed.push(player_id);
                    }
                }
            }
        }

        for player_id in overflowed {
            warn!(player_id, "outbound queue full; dropping slow connection");
            self.sessions.remove(&player_id);
        }
    }
}

// Returns false only when the queue is full.
fn send(player_id: PlayerId, session: &Session, event: ArenaEvent) -> bool {
    match session.outbound.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => false,
        Err(TrySendError::Closed(_)) => {
            // The socket task is gone; its leave event does the cleanup.
            debug!(player_id, "outbound queue closed; event dropped");
            true
        }
    }
}
