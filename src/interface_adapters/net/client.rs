use crate::domain::{PlayerId, PlayerIntent};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_connection_id;
use crate::use_cases::{ArenaEvent, GameEvent, OUTBOUND_CAPACITY};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, trace, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    // The world task dropped this connection's queue (join rejected or world stopped).
    OutboundClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let input_tx = state.input_tx.clone();
    ws.on_upgrade(move |socket| {
        // The connection id doubles as the player id for the lifetime of the socket.
        let player_id = next_connection_id();
        let span = info_span!("conn", conn_id = player_id, player_id);
        handle_socket(socket, input_tx, player_id).instrument(span)
    })
}

async fn handle_socket(
    mut socket: WebSocket,
    input_tx: mpsc::Sender<GameEvent>,
    player_id: PlayerId,
) {
    let mut ctx = match bootstrap_connection(player_id, &input_tx).await {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "server unavailable".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    info!("client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub input_tx: mpsc::Sender<GameEvent>,
    // Events addressed to this connection, in the order the world issued them.
    pub outbound_rx: mpsc::Receiver<ArenaEvent>,
    // Set once the bootstrap has come through the queue.
    pub bootstrapped: bool,
    // The queue closed before any bootstrap: the world never admitted this player.
    pub join_refused: bool,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,
    pub invalid_intents: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn bootstrap_connection(
    player_id: PlayerId,
    input_tx: &mpsc::Sender<GameEvent>,
) -> Result<ConnCtx, NetError> {
    let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);

    // Join is awaited, never dropped: the bootstrap arrives as the first outbound event.
    input_tx
        .send(GameEvent::Join {
            player_id,
            outbound,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        input_tx: input_tx.clone(),
        outbound_rx,
        bootstrapped: false,
        join_refused: false,

        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,

        invalid_json: 0,
        invalid_intents: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing arena event
            event = ctx.outbound_rx.recv() => {
                match event {
                    Some(event) => match forward_event(event, socket, ctx).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        fatal = Some(outbound_closed(ctx));
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => parsed,
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        return Ok(LoopControl::Continue);
                    }
                };

                match PlayerIntent::try_from(parsed) {
                    Ok(intent) => forward_intent(ctx, intent),
                    Err(e) => {
                        // Unknown direction: no-op.
                        ctx.invalid_intents += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(player_id, error = %e, "malformed intent ignored");
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn forward_intent(ctx: &mut ConnCtx, intent: PlayerIntent) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match ctx
        .input_tx
        .try_send(GameEvent::Intent { player_id, intent })
    {
        Ok(()) => {
            trace!(player_id, ?intent, "intent forwarded");
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            // Intents are lossy under load; the next move resends state anyway.
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id, "input channel full; dropping intent");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

fn outbound_closed(ctx: &mut ConnCtx) -> NetError {
    // The world opens every accepted queue with the bootstrap.
    if !ctx.bootstrapped {
        ctx.join_refused = true;
    }
    NetError::OutboundClosed
}

async fn forward_event(event: ArenaEvent, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    if matches!(event, ArenaEvent::Bootstrap(_)) {
        ctx.bootstrapped = true;
    }
    let msg = ServerMessage::from(event);
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send arena event");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    if ctx.join_refused {
        // The id belongs to someone else in the world; a leave would remove them.
        info!(player_id, "join refused; closing without leave");
        return Ok(());
    }
    ctx.input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        invalid_intents = ctx.invalid_intents,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Returns the context plus the queue sender the world would have kept.
    async fn joined_ctx(
        player_id: PlayerId,
        input_rx: &mut mpsc::Receiver<GameEvent>,
        input_tx: &mpsc::Sender<GameEvent>,
    ) -> (ConnCtx, mpsc::Sender<ArenaEvent>) {
        let ctx = bootstrap_connection(player_id, input_tx)
            .await
            .expect("input channel open");
        match input_rx.try_recv() {
            Ok(GameEvent::Join {
                player_id: joined,
                outbound,
            }) => {
                assert_eq!(joined, player_id);
                (ctx, outbound)
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn when_join_is_refused_then_cleanup_sends_no_leave() {
        let (input_tx, mut input_rx) = mpsc::channel(8);
        let (mut ctx, outbound) = joined_ctx(5, &mut input_rx, &input_tx).await;
        drop(outbound);

        assert!(ctx.outbound_rx.recv().await.is_none());
        assert!(matches!(outbound_closed(&mut ctx), NetError::OutboundClosed));
        disconnect_cleanup(&ctx).await.expect("cleanup succeeds");

        assert!(matches!(
            input_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn when_admitted_connection_loses_its_queue_then_cleanup_sends_leave() {
        let (input_tx, mut input_rx) = mpsc::channel(8);
        let (mut ctx, outbound) = joined_ctx(6, &mut input_rx, &input_tx).await;
        ctx.bootstrapped = true;
        drop(outbound);

        outbound_closed(&mut ctx);
        disconnect_cleanup(&ctx).await.expect("cleanup succeeds");

        assert!(matches!(
            input_rx.try_recv(),
            Ok(GameEvent::Leave { player_id: 6 })
        ));
    }

    #[tokio::test]
    async fn when_socket_closes_before_bootstrap_arrives_then_cleanup_still_sends_leave() {
        let (input_tx, mut input_rx) = mpsc::channel(8);
        let (ctx, _outbound) = joined_ctx(7, &mut input_rx, &input_tx).await;

        disconnect_cleanup(&ctx).await.expect("cleanup succeeds");

        assert!(matches!(
            input_rx.try_recv(),
            Ok(GameEvent::Leave { player_id: 7 })
        ));
    }
}
