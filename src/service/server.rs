//! TCP server and graceful shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::core::error::Result;
use crate::engine::Engine;
use crate::service::protocol::{SimulationRequest, SimulationResponse};

/// How long open connections get to flush replies after the engine drains
const CONNECTION_GRACE: Duration = Duration::from_secs(1);

/// Request handling shared by every connection
pub struct SimulationService {
    engine: Arc<Engine>,
}

impl SimulationService {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Parse and run one request line
    pub async fn handle_line(&self, line: &str) -> SimulationResponse {
        match serde_json::from_str::<SimulationRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!("Malformed simulation request: {}", e);
                SimulationResponse::Error(format!("malformed request: {}", e))
            }
        }
    }

    /// Run a request on the engine without blocking the async runtime
    pub async fn handle_request(&self, request: SimulationRequest) -> SimulationResponse {
        tracing::info!("Received simulation request.");
        match serde_json::to_string_pretty(&request.config) {
            Ok(config) => tracing::info!("Configuration: \n{}", config),
            Err(e) => tracing::debug!("Could not render configuration: {}", e),
        }

        let engine = Arc::clone(&self.engine);
        let config = request.config;
        match tokio::task::spawn_blocking(move || engine.simulate(&config)).await {
            Ok(Ok(result)) => SimulationResponse::Result(result),
            Ok(Err(e)) => {
                tracing::warn!("Simulation failed: {}", e);
                SimulationResponse::Error(e.to_string())
            }
            Err(e) => {
                tracing::error!("Simulation task failed: {}", e);
                SimulationResponse::Error(format!("simulation task failed: {}", e))
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, service: Arc<SimulationService>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = service.handle_line(&line).await;
        let mut payload = serde_json::to_string(&response)?;
        payload.push('\n');
        writer.write_all(payload.as_bytes()).await?;
    }
    Ok(())
}

/// Accept connections on `listener` until `shutdown` resolves.
///
/// On shutdown the listener stops accepting, the engine drains its
/// in-flight simulations, and remaining connections are given a short
/// grace period before being dropped.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<Engine>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let service = Arc::new(SimulationService::new(Arc::clone(&engine)));
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                tracing::debug!(%peer, "Accepted connection");
                let service = Arc::clone(&service);
                connections.spawn(async move {
                    if let Err(e) = handle_connection(stream, service).await {
                        tracing::warn!(%peer, "Connection closed with error: {}", e);
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    tracing::info!("Simulation service going down...");
    let drain = Arc::clone(&engine);
    if let Err(e) = tokio::task::spawn_blocking(move || drain.shutdown()).await {
        tracing::error!("Engine shutdown task failed: {}", e);
    }

    let flushed = tokio::time::timeout(CONNECTION_GRACE, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if flushed.is_err() {
        tracing::debug!(open = connections.len(), "Dropping idle connections");
        connections.shutdown().await;
    }
    Ok(())
}

/// Resolves on CTRL-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Simulation service received CTRL-C"),
        _ = terminate => tracing::info!("Simulation service received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::schedule::EncounterDescription;

    fn engine() -> Arc<Engine> {
        Arc::new(
            Engine::with_config(EngineConfig {
                worker_count: 2,
                trials: 16,
                seed: 5,
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_handle_request() {
        let service = SimulationService::new(engine());
        let request = SimulationRequest {
            config: EncounterDescription::new(0, 10_000).with_spawn(0, "Boss", "uniform"),
        };
        match service.handle_request(request).await {
            SimulationResponse::Result(result) => {
                assert_eq!(result.trials, 16);
                assert_eq!(result.enemies["Boss"].spawns, 16);
            }
            SimulationResponse::Error(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_line_is_an_error_response() {
        let service = SimulationService::new(engine());
        let response = service.handle_line("{not json").await;
        assert!(matches!(response, SimulationResponse::Error(_)));
    }

    #[tokio::test]
    async fn test_invalid_description_is_an_error_response() {
        let service = SimulationService::new(engine());
        let request = SimulationRequest {
            config: EncounterDescription::new(100, 0),
        };
        match service.handle_request(request).await {
            SimulationResponse::Error(e) => assert!(e.contains("Invalid time window")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_serve_round_trip_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let engine = engine();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, Arc::clone(&engine), async {
            let _ = stop_rx.await;
        }));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let request = SimulationRequest {
            config: EncounterDescription::new(0, 1000).with_spawn(10, "Boss", "burst"),
        };
        let mut line = serde_json::to_string(&request).unwrap();
        line.push('\n');
        writer.write_all(line.as_bytes()).await.unwrap();

        let mut lines = BufReader::new(reader).lines();
        let reply = lines.next_line().await.unwrap().unwrap();
        let response: SimulationResponse = serde_json::from_str(&reply).unwrap();
        assert!(response.is_ok());
        drop(writer);
        drop(lines);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert!(!engine.is_accepting());
    }
}
