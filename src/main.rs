//! Tic-Tac-Toe Sync Client Demo
//!
//! Connects to a broker, creates (or joins) a session and logs every
//! snapshot the remote authority sends.
//!
//! Usage: `tictactoe-client <identity> [session-id]`
//! Broker URL comes from `TTT_BROKER_URL` (default `ws://127.0.0.1:8080/ws`).

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use tictactoe_client::{
    GameClient, GameSnapshot, Mark, Notice, WebSocketConfig, WebSocketTransport, VERSION,
};

#[tokio::main]
async fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Tic-Tac-Toe Sync Client v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let Some(identity) = args.next() else {
        error!("usage: tictactoe-client <identity> [session-id]");
        std::process::exit(2);
    };
    let session_id = args.next();

    let url = std::env::var("TTT_BROKER_URL")
        .unwrap_or_else(|_| WebSocketConfig::default().url);
    let transport = WebSocketTransport::new(WebSocketConfig {
        url,
        ..Default::default()
    });

    let mut client = GameClient::new(transport);
    if let Err(e) = client.connect(identity.as_str()).await {
        error!(error = %e, "could not reach the broker");
        std::process::exit(1);
    }

    match &session_id {
        Some(id) => {
            info!(session = %id, "requesting to join");
            client.connect_to_game_by_id(id.clone()).await;
        }
        None => {
            info!("creating a new session");
            client.create_game().await;
        }
    }

    loop {
        match client.poll_update().await {
            Ok(true) => {
                if let Some(Notice::JoinRejected) = client.take_notice() {
                    info!("join request rejected by the session owner");
                    break;
                }
                if let Some(snapshot) = client.snapshot() {
                    log_snapshot(snapshot);
                } else if client.join_pending() {
                    info!("waiting for the owner to approve the join");
                }
            }
            Ok(false) => {
                info!("connection closed");
                break;
            }
            Err(e) => {
                error!(error = %e, "transport failure");
                break;
            }
        }
    }

    client.clear_identity().await;
}

/// Log one snapshot as three board rows plus the session status line.
fn log_snapshot(snapshot: &GameSnapshot) {
    for row in snapshot.board.chunks(3) {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| match cell {
                Some(Mark::X) => "X",
                Some(Mark::O) => "O",
                None => ".",
            })
            .collect();
        info!("{}", cells.join(" "));
    }
    info!(
        session = %snapshot.session_id,
        status = ?snapshot.status,
        turn = snapshot.current_turn_identity.as_deref().unwrap_or("-"),
        "session update"
    );
    if let Some(requester) = &snapshot.pending_joiner {
        info!(%requester, "join request pending approval");
    }
    if let Some(requester) = &snapshot.surrender_requester {
        info!(%requester, "surrender requested");
    }
    if let Some(requester) = &snapshot.rematch_requester {
        info!(%requester, "rematch requested");
    }
    if let Some(mark) = snapshot.winner_mark {
        info!(winner = ?mark, "game finished");
    }
}
