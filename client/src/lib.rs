//! # World Client Library
//!
//! The predicting half of the multiplayer world. The client applies the
//! player's input the moment it happens, through the exact movement
//! resolver the server runs, so the avatar never waits on a round-trip,
//! and reconciles with the server's authoritative snapshots as they arrive.
//!
//! ## How a frame goes
//!
//! 1. Drain the socket: snapshots re-anchor the local player and retarget
//!    remote avatars ([`network`], [`game`])
//! 2. Sample the keyboard and advance the local pose immediately; hand the
//!    input to the history buffer and the wire at the send cadence
//!    ([`input`])
//! 3. Replay unconfirmed inputs from the authoritative anchor and ease (or
//!    snap) the on-screen pose toward the result ([`game`])
//! 4. Draw the overhead view with the camera glued to the local player
//!    ([`rendering`])
//!
//! All of this runs on one cooperative frame loop; the socket is
//! non-blocking and there are no locks.
//!
//! Losing the server leaves the client predicting against its last anchor
//! indefinitely; reconnection is deliberately not automatic.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
