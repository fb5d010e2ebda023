use core_types::{RequestId, RequestKind};
use net::{FetchError, FetchRequest, FetchResponse};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum CoreCommand {
    // Network requests
    Fetch {
        request_id: RequestId,
        kind: RequestKind,
        request: FetchRequest,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CoreEvent {
    // Network -> UI
    FetchDone {
        request_id: RequestId,
        kind: RequestKind,
        response: FetchResponse,
    },
    FetchFailed {
        request_id: RequestId,
        kind: RequestKind,
        url: String,
        error: FetchError,
    },
}

impl CoreEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::FetchDone { request_id, .. } | CoreEvent::FetchFailed { request_id, .. } => {
                *request_id
            }
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub evt_rx: Receiver<CoreEvent>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
}

/// The runtime side of a [`Bus`].
pub struct RuntimeChannels {
    pub cmd_rx: Receiver<CoreCommand>,
    pub evt_tx: Sender<CoreEvent>,
}

pub fn bus() -> (Bus, RuntimeChannels) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    (
        Bus {
            cmd_tx,
            evt_rx,
            evt_tx: evt_tx.clone(),
        },
        RuntimeChannels { cmd_rx, evt_tx },
    )
}
