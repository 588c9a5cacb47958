use crate::metrics;
use crate::twoface::Fallible;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod board;

/// State shared by every board handler: the post store, and the authorship resolver picked
/// at startup.
#[derive(Clone)]
pub struct State<DS, R> {
    pub ds: Arc<DS>,
    pub resolver: Arc<R>,
    /// How long deletes wait before redirecting, so the store has settled by the time the
    /// redirected-to listing runs.
    pub settle: Duration,
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    metrics::HANDLER_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    metrics::RESPONSES
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}
