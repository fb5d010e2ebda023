//! The page as seen by the loader: its document, its URL and a way to reach the network.
use bus::CoreCommand;
use html::Document;
use std::sync::mpsc::Sender;
use url::Url;

pub trait BrowserContext {
    fn document(&self) -> &Document;
    fn document_mut(&mut self) -> &mut Document;
    fn location(&self) -> &Url;
    /// Hand a command to the runtimes. Returns `false` when nobody is listening anymore.
    fn send(&mut self, cmd: CoreCommand) -> bool;
}

pub struct Window {
    document: Document,
    location: Url,
    cmd_tx: Sender<CoreCommand>,
}

impl Window {
    pub fn new(document: Document, location: Url, cmd_tx: Sender<CoreCommand>) -> Self {
        Self {
            document,
            location,
            cmd_tx,
        }
    }
}

impl BrowserContext for Window {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn location(&self) -> &Url {
        &self.location
    }

    fn send(&mut self, cmd: CoreCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }
}
