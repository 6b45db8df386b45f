//! Server network layer handling UDP communications and the simulation tick

use crate::auth::Verifier;
use crate::session::SessionRegistry;
use crate::simulation::Simulation;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{InputCommand, Packet, WorldConfig, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    SessionTimeout {
        user_id: String,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the outgoing network task
#[derive(Debug)]
pub enum NetMessage {
    Send { packet: Packet, addr: SocketAddr },
    Broadcast { packet: Packet },
}

/// Main server coordinating networking and the authoritative simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionRegistry>>,
    simulation: Simulation,
    verifier: Box<dyn Verifier>,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    net_tx: mpsc::UnboundedSender<NetMessage>,
    net_rx: mpsc::UnboundedReceiver<NetMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_players: usize,
        world: WorldConfig,
        verifier: Box<dyn Verifier>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (net_tx, net_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionRegistry::new(max_players))),
            simulation: Simulation::new(world),
            verifier,
            tick_duration,
            server_tx,
            server_rx,
            net_tx,
            net_rx,
        })
    }

    /// Spawns the task that continuously listens for incoming datagrams
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 65_536];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        // malformed payloads are rejected here, at the
                        // boundary, and never reach the simulation
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Dropping malformed packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let sessions = Arc::clone(&self.sessions);
        let mut net_rx = std::mem::replace(&mut self.net_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = net_rx.recv().await {
                match message {
                    NetMessage::Send { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    NetMessage::Broadcast { packet } => {
                        let addrs = {
                            let sessions_guard = sessions.read().await;
                            sessions_guard.addrs()
                        };

                        // fire-and-forget: a slow or gone client only costs
                        // its own datagram
                        for addr in addrs {
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to {}: {}", addr, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns the task that sweeps for silent sessions
    fn spawn_timeout_checker(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut sessions_guard = sessions.write().await;
                    sessions_guard.check_timeouts()
                };

                for user_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::SessionTimeout { user_id }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.net_tx.send(NetMessage::Send { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet) {
        if let Err(e) = self.net_tx.send(NetMessage::Broadcast { packet }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Processes one incoming packet against registry and simulation
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect {
                client_version,
                user_id,
                token,
            } => {
                if client_version != PROTOCOL_VERSION {
                    self.send_packet(
                        Packet::Disconnected {
                            reason: format!(
                                "Protocol version mismatch (server: {})",
                                PROTOCOL_VERSION
                            ),
                        },
                        addr,
                    );
                    return;
                }

                // the identity boundary: all the core consumes is this bool
                if !self.verifier.verify(&user_id, &token) {
                    warn!("Refused unauthenticated connect for {} from {}", user_id, addr);
                    self.send_packet(
                        Packet::Disconnected {
                            reason: "You are not authorised to connect to this server".to_string(),
                        },
                        addr,
                    );
                    return;
                }

                info!("User {} connecting from {}", user_id, addr);

                // a reconnecting user replaces their stale session
                {
                    let mut sessions = self.sessions.write().await;
                    if sessions.remove_session(&user_id) {
                        self.simulation.remove_player(&user_id);
                    }
                }

                let session_id = {
                    let mut sessions = self.sessions.write().await;
                    sessions.add_session(&user_id, addr)
                };

                if let Some(session_id) = session_id {
                    self.simulation.add_player(&user_id);
                    self.send_packet(Packet::Connected { session_id }, addr);
                    // one-shot world read before simulation begins
                    self.send_packet(
                        Packet::World {
                            config: (**self.simulation.world()).clone(),
                        },
                        addr,
                    );
                } else {
                    self.send_packet(
                        Packet::Disconnected {
                            reason: "Server full".to_string(),
                        },
                        addr,
                    );
                }
            }

            Packet::Input { id, controls, ts } => {
                let user_id = {
                    let sessions = self.sessions.read().await;
                    sessions.find_user_by_addr(addr)
                };

                // inputs from unknown addresses, or naming a player other
                // than the sender's own, are dropped without ceremony
                let Some(user_id) = user_id else {
                    debug!("Dropping input from unknown address {}", addr);
                    return;
                };
                if user_id != id {
                    debug!("Dropping input for {} sent by {}", id, user_id);
                    return;
                }

                let mut sessions = self.sessions.write().await;
                sessions.push_input(&user_id, InputCommand { controls, ts });
            }

            Packet::Disconnect => {
                let user_id = {
                    let sessions = self.sessions.read().await;
                    sessions.find_user_by_addr(addr)
                };

                if let Some(user_id) = user_id {
                    self.drop_player(&user_id).await;
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Removes a player and tells everyone immediately, without waiting for
    /// the next tick, so remaining clients drop the avatar right away.
    async fn drop_player(&mut self, user_id: &str) {
        {
            let mut sessions = self.sessions.write().await;
            sessions.remove_session(user_id);
        }
        self.simulation.remove_player(user_id);

        self.broadcast_packet(Packet::Snapshot {
            players: self.simulation.snapshot(),
        });
    }

    /// Broadcasts the full per-player state map to all connected clients
    async fn broadcast_snapshot(&mut self) {
        let session_count = {
            let sessions = self.sessions.read().await;
            sessions.len()
        };

        if session_count == 0 {
            return;
        }

        self.broadcast_packet(Packet::Snapshot {
            players: self.simulation.snapshot(),
        });
    }

    /// Main server loop coordinating packet handling and the fixed tick
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut tick_interval = interval(self.tick_duration);
        let mut last_tick = Instant::now();
        let mut tick: u64 = 0;

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::SessionTimeout { user_id }) => {
                            info!("Session for {} timed out", user_id);
                            self.simulation.remove_player(&user_id);
                            self.broadcast_packet(Packet::Snapshot {
                                players: self.simulation.snapshot(),
                            });
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle simulation tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    {
                        let mut sessions = self.sessions.write().await;
                        self.simulation.advance(&mut sessions, dt);
                    }
                    self.broadcast_snapshot().await;

                    tick += 1;
                    if tick % 64 == 0 && self.simulation.player_count() > 0 {
                        debug!(
                            "Tick {}: {} players, {:.1}Hz",
                            tick,
                            self.simulation.player_count(),
                            1.0 / dt
                        );
                    }
                },
            }
        }

        Ok(())
    }
}
