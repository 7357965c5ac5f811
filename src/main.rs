//! Chat Relay Server - Binary Entry Point
//!
//! This is the main entry point for the chat-server binary.

use std::sync::Arc;

use chat_relay::api::http::create_router;
use chat_relay::api::websocket::state::AppState;
use chat_relay::chat::ChatLog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let chat = Arc::new(ChatLog::new()?);

    let heads = chat.head_cursor();
    println!(
        "Loaded chat log: {} users, {} messages, {} rooms, {} room messages.",
        heads.users, heads.messages, heads.rooms, heads.room_messages
    );

    let state = Arc::new(AppState::new(chat));
    let app = create_router(state);

    let addr = std::env::var("CHAT_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    println!("Shutdown signal received");
}
