//! Request scopes - concurrent handlers with their own current instance.
//!
//! This example demonstrates:
//! - Opting a type into context tracking with an empty `ContextInstance` impl
//! - Entering one context per inbound unit of work with `scope::spawn`
//! - Reading the current instance deep in the call chain without parameter
//!   threading
//!
//! Run with:
//!
//! ```sh
//! cargo run --example request_scopes
//! ```

use taskscope::{scope, ContextInstance};
use tracing_subscriber::EnvFilter;

/// The "active client" every handler wants access to.
#[derive(Debug)]
struct Bot {
    token: String,
}

impl ContextInstance for Bot {}

/// Deep inside the handler call chain: no `Bot` parameter in sight.
async fn send_reply(chat_id: u64, text: &str) {
    let bot = Bot::current().expect("handler entered without a current bot");
    tracing::info!(bot = %bot.token, chat_id, text, "sending reply");
}

async fn handle_update(update_id: u64) {
    send_reply(update_id * 10, &format!("handled update {update_id}")).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // One spawned context per inbound update; each task sees only its own bot.
    let mut handles = Vec::new();
    for id in 1u64..=3 {
        handles.push(scope::spawn(async move {
            let _restore = Bot::set_current(Bot {
                token: format!("bot-{id}"),
            });
            handle_update(id).await;
        }));
    }

    for handle in handles {
        handle.await.expect("handler task panicked");
    }
}
