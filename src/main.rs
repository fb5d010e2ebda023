use bus::CoreCommand;
use clap::Parser;
use html::Document;
use mimalloc::MiMalloc;
use page_loader::{ClickOutcome, PageLoader, PageLoaderConfig, Window, load_config};
use runtime_net::start_net_runtime;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Load a page, click through its fetch-driven links and forms, and print the result.
#[derive(Parser, Debug)]
#[command(name = "ajax-page-loader", version)]
struct Cli {
    /// HTML file holding the initial page.
    #[arg(long)]
    page: PathBuf,

    /// URL the page is served from; relative URLs resolve against it.
    #[arg(long)]
    base_url: Url,

    /// Selector of an element to click. Repeatable; clicks run in order, each one settling
    /// before the next.
    #[arg(long = "click")]
    clicks: Vec<String>,

    /// TOML file with loader settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for each click's requests.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Selector of the region to print; the whole document when absent.
    #[arg(long)]
    print: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let html = fs::read_to_string(&cli.page)
        .map_err(|e| format!("reading {}: {e}", cli.page.display()))?;
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PageLoaderConfig::default(),
    };

    let (bus, runtime) = bus::bus();
    let net_handle = start_net_runtime(runtime)?;
    // Only the runtime may hold an event sender, so its exit closes `evt_rx`.
    let bus::Bus {
        cmd_tx,
        evt_rx,
        evt_tx,
    } = bus;
    drop(evt_tx);
    let window = Window::new(Document::parse(&html), cli.base_url, cmd_tx.clone());
    let mut loader: PageLoader = PageLoader::new(window, config)?;
    log::info!("{} interactive element(s) wired", loader.controller_count());

    let timeout = Duration::from_secs(cli.timeout);
    for selector in &cli.clicks {
        let Some(element) = loader.document().query_selector(selector)? else {
            log::warn!("`{selector}` matches nothing, skipping");
            continue;
        };
        match loader.click(element) {
            ClickOutcome::Intercepted(cycle) => log::info!("`{selector}` started cycle {cycle}"),
            ClickOutcome::Cancelled => log::info!("`{selector}` was cancelled by its click guard"),
            ClickOutcome::NotIntercepted => {
                log::warn!("`{selector}` was not intercepted, a browser would navigate")
            }
        }
        if !loader.run_until_settled(&evt_rx, timeout) {
            log::warn!("`{selector}` did not settle within {}s", cli.timeout);
        }
    }

    let doc = loader.document();
    let output = match &cli.print {
        Some(selector) => doc
            .query_selector(selector)?
            .map(|id| doc.inner_html(id))
            .ok_or_else(|| format!("`{selector}` matches nothing"))?,
        None => doc.inner_html(doc.root()),
    };
    println!("{output}");

    let _ = cmd_tx.send(CoreCommand::Shutdown);
    if net_handle.join().is_err() {
        log::warn!("network runtime panicked");
    }
    Ok(())
}
