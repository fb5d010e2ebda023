// crates/runtime_net/src/lib.rs
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use bus::{CoreCommand, CoreEvent, RuntimeChannels};
use net::{FetchError, HttpClient, fetch_text};

/// Spawn the network runtime. Each fetch runs on its own worker thread so overlapping
/// interaction cycles never wait on each other; there is no cancellation.
pub fn start_net_runtime(channels: RuntimeChannels) -> Result<JoinHandle<()>, FetchError> {
    let client = Arc::new(HttpClient::new()?);
    let RuntimeChannels { cmd_rx, evt_tx } = channels;
    Ok(thread::spawn(move || run(client, cmd_rx, evt_tx)))
}

fn run(client: Arc<HttpClient>, cmd_rx: Receiver<CoreCommand>, evt_tx: Sender<CoreEvent>) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            CoreCommand::Fetch {
                request_id,
                kind,
                request,
            } => {
                log::debug!(
                    target: "runtime_net",
                    "request {request_id} ({kind:?}): {} {}",
                    request.method,
                    request.url
                );
                let evt_tx = evt_tx.clone();
                let url = request.url.clone();
                fetch_text(
                    Arc::clone(&client),
                    request,
                    Arc::new(move |result| {
                        let evt = match result {
                            Ok(response) => CoreEvent::FetchDone {
                                request_id,
                                kind,
                                response,
                            },
                            Err(error) => CoreEvent::FetchFailed {
                                request_id,
                                kind,
                                url: url.clone(),
                                error,
                            },
                        };
                        // The UI side may already be gone during shutdown.
                        let _ = evt_tx.send(evt);
                    }),
                );
            }
            CoreCommand::Shutdown => break,
        }
    }
    log::debug!(target: "runtime_net", "network runtime stopped");
}
