//! Client transport: a non-blocking UDP socket polled once per frame.
//!
//! The render loop, input sampling, and packet receipt all run on the same
//! cooperative frame loop, so the socket is drained with non-blocking reads
//! at the top of each frame instead of from a background task. Sends are
//! fire-and-forget; there is no retry, so a lost input is simply never
//! reflected in the authoritative state.

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{InputCommand, Packet, PROTOCOL_VERSION};
use std::io::ErrorKind;
use std::net::UdpSocket;

pub struct NetworkClient {
    socket: UdpSocket,
    user_id: String,
    session_id: Option<u32>,
    connected: bool,
    buffer: Box<[u8; 65_536]>,
}

impl NetworkClient {
    /// Binds an ephemeral local socket and sends the connect handshake.
    pub fn connect(
        server: &str,
        user_id: &str,
        token: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(server)?;
        socket.set_nonblocking(true)?;

        info!("Connecting to {} as {}", server, user_id);

        let client = Self {
            socket,
            user_id: user_id.to_string(),
            session_id: None,
            connected: false,
            buffer: Box::new([0u8; 65_536]),
        };

        client.send(&Packet::Connect {
            client_version: PROTOCOL_VERSION,
            user_id: user_id.to_string(),
            token: token.to_string(),
        });

        Ok(client)
    }

    /// Drains every datagram currently queued on the socket and returns the
    /// decoded packets in arrival order. Connection bookkeeping happens
    /// here; everything else is the caller's business.
    pub fn poll(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv(&mut self.buffer[..]) {
                Ok(len) => match deserialize::<Packet>(&self.buffer[0..len]) {
                    Ok(packet) => {
                        match &packet {
                            Packet::Connected { session_id } => {
                                info!("Connected, session {}", session_id);
                                self.session_id = Some(*session_id);
                                self.connected = true;
                            }
                            Packet::Disconnected { reason } => {
                                warn!("Disconnected: {}", reason);
                                self.session_id = None;
                                self.connected = false;
                            }
                            _ => {}
                        }
                        packets.push(packet);
                    }
                    Err(e) => warn!("Dropping malformed packet: {}", e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    break;
                }
            }
        }

        packets
    }

    /// Transmits one input command, tagged with this client's identity.
    pub fn send_input(&self, command: &InputCommand) {
        if !self.connected {
            return;
        }

        self.send(&Packet::Input {
            id: self.user_id.clone(),
            controls: command.controls,
            ts: command.ts,
        });
    }

    pub fn send_disconnect(&self) {
        if self.connected {
            self.send(&Packet::Disconnect);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn send(&self, packet: &Packet) {
        match serialize(packet) {
            Ok(data) => {
                if let Err(e) = self.socket.send(&data) {
                    error!("Failed to send packet: {}", e);
                }
            }
            Err(e) => error!("Failed to serialize packet: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;

    #[test]
    fn test_connect_sends_handshake() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();

        let _client = NetworkClient::connect(&server_addr.to_string(), "alice", "secret").unwrap();

        let mut buffer = [0u8; 2048];
        let (len, _) = server.recv_from(&mut buffer).unwrap();
        let packet: Packet = deserialize(&buffer[0..len]).unwrap();

        match packet {
            Packet::Connect {
                client_version,
                user_id,
                token,
            } => {
                assert_eq!(client_version, PROTOCOL_VERSION);
                assert_eq!(user_id, "alice");
                assert_eq!(token, "secret");
            }
            _ => panic!("Expected a connect packet"),
        }
    }

    #[test]
    fn test_poll_decodes_ack_and_marks_connected() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();

        let mut client =
            NetworkClient::connect(&server_addr.to_string(), "alice", "secret").unwrap();
        assert!(!client.is_connected());

        let mut buffer = [0u8; 2048];
        let (_, client_addr) = server.recv_from(&mut buffer).unwrap();

        let ack = serialize(&Packet::Connected { session_id: 3 }).unwrap();
        server.send_to(&ack, client_addr).unwrap();

        // non-blocking socket: wait briefly for delivery
        std::thread::sleep(std::time::Duration::from_millis(50));

        let packets = client.poll();
        assert_eq!(packets.len(), 1);
        assert!(matches!(packets[0], Packet::Connected { session_id: 3 }));
        assert!(client.is_connected());
    }

    #[test]
    fn test_inputs_not_sent_before_ack() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        server
            .set_read_timeout(Some(std::time::Duration::from_millis(100)))
            .unwrap();

        let client = NetworkClient::connect(&server_addr.to_string(), "alice", "secret").unwrap();

        let mut buffer = [0u8; 2048];
        // swallow the handshake
        server.recv_from(&mut buffer).unwrap();

        client.send_input(&InputCommand {
            controls: shared::Controls::default(),
            ts: 1,
        });

        // nothing should arrive: the client is not connected yet
        assert!(server.recv_from(&mut buffer).is_err());
    }
}
