use crate::config::Config;
use crate::metrics::Metrics;
use crate::probe::Prober;
use crate::rollover::DailyLatch;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::header::{self, HeaderValue};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Everything one probe request needs.
///
/// Sits behind a single mutex: the gauges are single slots shared across
/// targets, so two concurrent scrapes must not interleave their writes and
/// renders, or one target's scrape would carry another target's values.
struct ProbeContext {
    prober: Prober,
    metrics: Metrics,
    latch: DailyLatch,
}

/// Run the scrape endpoint until the process is stopped.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let metrics = Metrics::new()?;
    let context = Arc::new(Mutex::new(ProbeContext {
        prober: Prober::new(config.timeout()),
        metrics,
        latch: DailyLatch::new(),
    }));

    let addr: SocketAddr = config.listen_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("starting tasmota exporter on {}", addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let context = context.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let context = context.clone();
                async move { handle_request(req, context).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("connection error: {}", err);
            }
        });
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    context: Arc<Mutex<ProbeContext>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.uri().path() != "/probe" {
        return Ok(plain_response(StatusCode::NOT_FOUND, "Not Found"));
    }

    let Some(target) = query_param(req.uri().query(), "target").map(str::to_string) else {
        return Ok(plain_response(
            StatusCode::BAD_REQUEST,
            "Target parameter is missing",
        ));
    };

    // The device fetch blocks on the network, so it leaves the async
    // executor for the duration of the probe.
    let body = tokio::task::spawn_blocking(move || run_probe(&target, &context)).await;

    match body {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
            );
            Ok(response)
        }
        Err(err) => {
            error!("probe task failed: {}", err);
            Ok(plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "probe task failed",
            ))
        }
    }
}

/// Probe one target and render the registry, all under the context lock.
fn run_probe(target: &str, context: &Mutex<ProbeContext>) -> String {
    let mut context = context.lock();
    let ProbeContext {
        prober,
        metrics,
        latch,
    } = &mut *context;

    let now = chrono::Local::now().naive_local();
    let start = Instant::now();
    let result = prober.probe(target, metrics, latch, now);
    let duration = start.elapsed().as_secs_f64();

    metrics.probe_duration_seconds.set(duration);
    match result {
        Ok(()) => {
            metrics.probe_success.set(1.0);
            info!("{}: probe succeeded, duration: {:.3}s", target, duration);
        }
        Err(err) => {
            metrics.probe_success.set(0.0);
            warn!("{}: probe failed, duration: {:.3}s ({})", target, duration, err);
        }
    }

    metrics.render().unwrap_or_else(|err| {
        error!("failed to encode metrics: {}", err);
        String::new()
    })
}

fn plain_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Pull a single parameter out of a raw query string. Targets are plain
/// host:port strings, so no percent-decoding is needed.
fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}
