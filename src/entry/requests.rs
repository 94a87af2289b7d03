use reqwest::{Client, Request, Url};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use pacebench::args::BenchArgs;
use pacebench::error::{AppError, AppResult, HttpError};

use crate::shutdown::ShutdownReceiver;

/// Requests buffered ahead of the dispatch loop.
const REQUEST_CHANNEL_CAPACITY: usize = 256;

const USER_AGENT: &str = concat!("pacebench/", env!("CARGO_PKG_VERSION"));

pub(super) fn build_request_template(
    client: &Client,
    args: &BenchArgs,
    url_raw: &str,
) -> AppResult<Request> {
    let url = Url::parse(url_raw).map_err(|err| {
        AppError::http(HttpError::InvalidUrl {
            url: url_raw.to_owned(),
            source: err,
        })
    })?;

    client
        .request(args.method.into(), url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .body(args.data.clone())
        .build()
        .map_err(|err| AppError::http(HttpError::BuildRequestFailed { source: err }))
}

/// Feeds `total` copies of `template` into a bounded channel. Shutdown stops
/// the feed, which the dispatch loop sees as the end of the request stream.
pub(super) fn spawn_request_generator(
    template: Request,
    total: u64,
    mut shutdown_rx: ShutdownReceiver,
) -> (mpsc::Receiver<Request>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        for _ in 0..total {
            let Some(request) = template.try_clone() else {
                error!("Request body cannot be cloned; stopping the request feed");
                break;
            };
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, no further requests will be sent");
                    break;
                }
                sent = tx.send(request) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
    });
    (rx, handle)
}
