//! `SketchServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → rooms.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use sketchroom_protocol::{Codec, JsonCodec};
use sketchroom_room::{GameConfig, RoomManager, WordBank};
use sketchroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{Config, SketchError};

/// Shared server state passed to each connection handler task.
///
/// The registry lock is only held for registry bookkeeping; in-room
/// traffic goes straight to a cloned [`RoomHandle`](sketchroom_room::RoomHandle).
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Sketchroom server.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), sketchroom::SketchError> {
/// use sketchroom::prelude::*;
///
/// let server = SketchServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SketchServerBuilder {
    bind_addr: String,
    game: GameConfig,
    words: WordBank,
}

impl SketchServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            game: GameConfig::default(),
            words: WordBank::builtin(),
        }
    }

    /// Takes the listen address and round length from `config`.
    pub fn config(self, config: &Config) -> Self {
        self.bind(&config.bind_address())
            .game_config(config.game_config())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the round settings every room uses.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Sets the words rounds are drawn from.
    pub fn words(mut self, words: WordBank) -> Self {
        self.words = words;
        self
    }

    /// Validates the settings and binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<SketchServer<JsonCodec>, SketchError> {
        self.game.validate()?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(self.game, self.words)),
            codec: JsonCodec,
        });

        Ok(SketchServer { transport, state })
    }
}

impl Default for SketchServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Sketchroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SketchServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl SketchServer {
    /// Creates a new builder.
    pub fn builder() -> SketchServerBuilder {
        SketchServerBuilder::new()
    }
}

impl<C: Codec> SketchServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, SketchError> {
        Ok(self.transport.local_addr()?)
    }

    /// Accepts connections until the process is terminated.
    pub async fn run(self) -> Result<(), SketchError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Each connection gets its own handler task. A failed accept is
    /// logged and the loop carries on.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), SketchError> {
        tracing::info!("Sketchroom server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting");
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
