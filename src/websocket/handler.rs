use crate::{
    models::{GameState, PlayerIdentity, RegisterRequest},
    websocket::messages::{ClientMessage, ServerMessage},
    AppState, Session,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    state
        .sessions
        .insert(connection_id, Session::new(connection_id, tx.clone()));
    tracing::info!("WebSocket connection established: {}", connection_id);

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state_for_recv, &tx, connection_id)
                                .await
                        {
                            tracing::error!("Error handling message: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected: {}", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    let Some((_, session)) = state.sessions.remove(&connection_id) else {
        return;
    };

    if let Some(player) = &session.player {
        if state.config.server.reset_on_disconnect && state.table.abandon_if_seated(player).await
        {
            tracing::info!(
                "Player {} ({}) disconnected mid-game, game abandoned",
                player.name,
                player.player_id
            );
        }
    }

    tracing::info!(
        "WebSocket connection closed: {} (open for {}s)",
        session.connection_id,
        (Utc::now() - session.connected_at).num_seconds()
    );
}

/// Push a new game snapshot to every open connection.
///
/// Never waits on a socket: a client whose outbound queue is full misses this
/// snapshot and can catch up with `get_status`.
pub fn broadcast_state(state: &AppState, game_state: GameState) {
    let message = ServerMessage::StateChanged { state: game_state };
    for session in state.sessions.iter() {
        match session.tx.try_send(message.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    "Outbound queue full for {}, dropping state update",
                    session.connection_id
                );
            }
            // Socket is closing; its session is removed on the way out
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Remember (or forget) which player this connection is seated as
fn bind_player(state: &AppState, connection_id: Uuid, player: Option<PlayerIdentity>) {
    if let Some(mut session) = state.sessions.get_mut(&connection_id) {
        session.player = player;
    }
}

fn seated_player(state: &AppState, connection_id: Uuid) -> Option<PlayerIdentity> {
    state
        .sessions
        .get(&connection_id)
        .and_then(|session| session.player.clone())
}

/// Handle individual client messages
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    connection_id: Uuid,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::Register { name, player_id } => {
            let request = RegisterRequest { name, player_id };
            match state.table.register(&request).await {
                Ok(identity) if identity.is_empty() => {
                    bind_player(state, connection_id, None);
                    tx.send(ServerMessage::Abandoned).await?;
                }
                Ok(identity) => {
                    tracing::info!(
                        "Connection {} seated as player {} ({})",
                        connection_id,
                        identity.player_id,
                        identity.name
                    );
                    bind_player(state, connection_id, Some(identity.clone()));
                    tx.send(ServerMessage::Registered { player: identity })
                        .await?;
                }
                Err(e) => {
                    tx.send(ServerMessage::Error {
                        message: e.to_string(),
                    })
                    .await?;
                }
            }
        }
        ClientMessage::Abandon => {
            tracing::info!("Connection {} abandoning game", connection_id);
            state.table.abandon().await;
            bind_player(state, connection_id, None);
            tx.send(ServerMessage::Abandoned).await?;
        }
        ClientMessage::GetStatus => {
            let game_state = state.table.status().await;
            tx.send(ServerMessage::Status { state: game_state }).await?;
        }
        ClientMessage::GetTurn => {
            let slot = state.table.turn().await;
            tx.send(ServerMessage::Turn {
                player_id: slot.id(),
            })
            .await?;
        }
        ClientMessage::AttemptMove { player_id, column } => {
            let Some(player) = seated_player(state, connection_id) else {
                let outcome = state.table.attempt_move(player_id, column).await;
                tx.send(ServerMessage::MoveResult { outcome }).await?;
                return Ok(());
            };

            // A seated connection may only move for its own seat
            if player.player_id as i64 != player_id {
                tx.send(ServerMessage::Error {
                    message: format!("this connection is seated as player {}", player.player_id),
                })
                .await?;
                return Ok(());
            }

            match state
                .table
                .attempt_seated_move(&player, player_id, column)
                .await
            {
                Some(outcome) => {
                    tx.send(ServerMessage::MoveResult { outcome }).await?;
                }
                None => {
                    tracing::info!(
                        "Connection {} lost seat {} to a reset, unbinding",
                        connection_id,
                        player.player_id
                    );
                    bind_player(state, connection_id, None);
                    tx.send(ServerMessage::Error {
                        message: "seat no longer held: the game was reset, register again"
                            .to_string(),
                    })
                    .await?;
                }
            }
        }
        ClientMessage::Reset => {
            tracing::info!("Connection {} resetting game", connection_id);
            state.table.reset().await;
            bind_player(state, connection_id, None);
            let game_state = state.table.status().await;
            tx.send(ServerMessage::Status { state: game_state }).await?;
        }
    }

    Ok(())
}
