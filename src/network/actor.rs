//! Network actor - runs HTTP requests in the Tokio runtime
//!
//! Each request runs as its own task so a slow server never holds up
//! editing; completions flow back on the response channel.

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::execute_definition;

/// Network actor that processes HTTP request commands
pub struct NetworkActor {
    client: reqwest::Client,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(client: reqwest::Client, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteRequest { id, record, request }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = %request.method, "Executing request");
                                let result = execute_definition(&client, &request).await;
                                match &result {
                                    Ok(resp) => tracing::info!(id, status = resp.status, time_ms = resp.time_ms, "Request completed"),
                                    Err(e) => tracing::warn!(id, error = %e, "Request failed"),
                                }
                                let _ = response_tx.send(NetworkResponse::Completed { id, record, result });
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                    }
                }

                // Reap finished tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::models::{RecordId, RequestDefinition};
    use crate::network::client::create_client;

    #[tokio::test]
    async fn test_invalid_request_comes_back_as_completion() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(create_client(None), resp_tx).run(cmd_rx));

        let request = RequestDefinition {
            url: "example.com/path".into(),
            ..Default::default()
        };
        cmd_tx
            .send(NetworkCommand::ExecuteRequest { id: 7, record: RecordId(3), request })
            .unwrap();

        match resp_rx.recv().await.unwrap() {
            NetworkResponse::Completed { id, record, result } => {
                assert_eq!(id, 7);
                assert_eq!(record, RecordId(3));
                assert!(matches!(result, Err(ExecutionError::InvalidUrl(_))));
            }
        }

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
