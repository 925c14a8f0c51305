//! Game server implementation.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use protocol::{GameCode, ServerEvent};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, broadcast};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};
use tracing::{error, info, warn};

use crate::config::Config;

pub mod client;
pub mod hub;

pub use hub::{DirectEvent, Hub, Outbox, Outcome, RoomEvent, run_tick_loop};

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    /// Number of connections per IP address.
    ip_connections: HashMap<IpAddr, usize>,
    /// Total number of connections.
    total_connections: usize,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            ip_connections: HashMap::new(),
            total_connections: 0,
        }
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, ip: IpAddr, max_total: usize, max_per_ip: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }

        let current = self.ip_connections.get(&ip).copied().unwrap_or(0);
        if current >= max_per_ip {
            return false;
        }

        *self.ip_connections.entry(ip).or_insert(0) += 1;
        self.total_connections += 1;
        true
    }

    /// Remove a connection.
    fn remove_connection(&mut self, ip: IpAddr) {
        if let Some(count) = self.ip_connections.get_mut(&ip) {
            if *count > 0 {
                *count -= 1;
                self.total_connections = self.total_connections.saturating_sub(1);
            }
            if *count == 0 {
                self.ip_connections.remove(&ip);
            }
        }
    }
}

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    // Connection tracking state
    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));

    // Fan-out channels: room multicast plus single-connection addressing
    let (room_tx, _room_rx) = broadcast::channel::<RoomEvent>(256);
    let (direct_tx, _direct_rx) = broadcast::channel::<DirectEvent>(256);

    let tick_interval = config.server.tick_interval_ms;
    let max_connections = config.server.max_connections;
    let ip_limit = config.server.ip_limit;

    // Shared dispatcher state
    let hub = Arc::new(RwLock::new(Hub::new(
        config,
        Outbox::new(room_tx.clone(), direct_tx.clone()),
    )));

    // Start the timer tick loop
    let tick_hub = Arc::clone(&hub);
    tokio::spawn(async move {
        run_tick_loop(tick_hub, tick_interval).await;
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        let ip = addr.ip();

        // Check connection limits
        {
            let mut state = conn_state.write().await;
            if !state.try_add_connection(ip, max_connections, ip_limit) {
                warn!("Connection rejected (limit reached): {}", addr);
                continue;
            }
        }

        let hub = Arc::clone(&hub);
        let conn_state = Arc::clone(&conn_state);
        let room_rx = room_tx.subscribe();
        let direct_rx = direct_tx.subscribe();

        tokio::spawn(async move {
            let result = handle_connection(stream, addr, hub, room_rx, direct_rx).await;

            // Always remove from connection tracking when done
            {
                let mut state = conn_state.write().await;
                state.remove_connection(addr.ip());
            }

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    hub: Arc<RwLock<Hub>>,
    mut room_rx: broadcast::Receiver<RoomEvent>,
    mut direct_rx: broadcast::Receiver<DirectEvent>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New connection from {}", addr);

    let (mut write, mut read) = ws_stream.split();

    // Register the connection
    let client_id = {
        let mut state = hub.write().await;
        state.add_client(addr)
    };

    // The room this connection belongs to, refreshed after every inbound
    // event. Used to filter the room multicast stream.
    let mut joined: Option<GameCode> = None;

    // Message loop - handle both incoming events and broadcasts
    loop {
        tokio::select! {
            // Handle incoming WebSocket messages
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let mut state = hub.write().await;
                        joined = state.handle_frame(client_id, &text);
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => {
                        break;
                    }
                    _ => {}
                }
            }
            // Handle room multicast events
            room_msg = room_rx.recv() => {
                if let Ok(room) = room_msg {
                    if joined.as_ref() == Some(&room.code) {
                        if let Err(e) = send_event(&mut write, &room.event).await {
                            warn!("Failed to send to {}: {}", addr, e);
                            break;
                        }
                    }
                }
            }
            // Handle events addressed to this connection only
            direct_msg = direct_rx.recv() => {
                if let Ok(direct) = direct_msg {
                    if direct.to == client_id {
                        if let Err(e) = send_event(&mut write, &direct.event).await {
                            warn!("Failed to send to {}: {}", addr, e);
                            break;
                        }
                    }
                }
            }
        }
    }

    // Drop the connection record; session rosters are left untouched
    {
        let mut state = hub.write().await;
        state.remove_client(client_id);
    }

    Ok(())
}

async fn send_event(
    write: &mut SplitSink<WebSocketStream<TcpStream>, Message>,
    event: &ServerEvent,
) -> anyhow::Result<()> {
    let frame = event.encode()?;
    write.send(Message::Text(frame.into())).await?;
    Ok(())
}
