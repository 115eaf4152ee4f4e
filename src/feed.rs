use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use reqwest::blocking::Client;

use crate::api::{self, FetchFailed, FetchRequest};
use crate::config::Config;
use crate::http_client::http_client;
use crate::state::{Delta, ProviderCommand};
use crate::wiring::Dispatch;

/// Sends fetch requests to the provider thread.
#[derive(Debug, Clone)]
pub struct ChannelDispatch {
    tx: Sender<ProviderCommand>,
}

impl ChannelDispatch {
    pub fn new(tx: Sender<ProviderCommand>) -> Self {
        Self { tx }
    }
}

impl Dispatch for ChannelDispatch {
    fn dispatch(&mut self, request: FetchRequest) -> Result<(), FetchFailed> {
        let endpoint = request.kind.endpoint();
        self.tx
            .send(ProviderCommand::Fetch(request))
            .map_err(|_| FetchFailed::new(endpoint, "fetch worker stopped"))
    }
}

/// Runs until every `ProviderCommand` sender is dropped. Each request becomes
/// one job on the fetch pool and answers with exactly one `Delta::Fetched`.
pub fn spawn_provider(
    config: &Config,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    let base = config.api_base.clone();
    let timeout = config.request_timeout;
    let parallelism = config.fetch_parallelism;

    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        let client = match http_client(timeout) {
            Ok(client) => Some(client),
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] HTTP client unavailable: {err:#}")));
                None
            }
        };

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Fetch(request) => {
                    let tx = tx.clone();
                    let base = base.clone();
                    let job = move || run_request(client, &base, request, &tx);
                    if let Some(pool) = pool.as_ref() {
                        pool.spawn(job);
                    } else {
                        thread::spawn(job);
                    }
                }
            }
        }
    })
}

fn run_request(client: Option<&Client>, base: &str, request: FetchRequest, tx: &Sender<Delta>) {
    let endpoint = request.kind.endpoint();
    let result = match client {
        Some(client) => api::fetch(client, base, &request.kind),
        None => Err(FetchFailed::new(endpoint, "no http client")),
    };
    let _ = tx.send(Delta::Fetched {
        endpoint,
        generation: request.generation,
        result,
    });
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("matchstats-fetch-{idx}"))
        .build()
        .ok()
}
