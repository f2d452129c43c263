use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// Decides how long to hold off before the next unit of work.
///
/// The harvest loops only call [`Pacer::wait`]; swapping the implementation
/// changes the request rate without touching fetch or filter logic.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self, delay: Duration);
}

/// Sleeps for the full requested delay on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn wait(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        trace!(delay_ms = delay.as_millis() as u64, "Pausing before next request");
        tokio::time::sleep(delay).await;
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn wait(&self, _delay: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_tokio_pacer_sleeps_for_delay() {
        let start = Instant::now();
        TokioPacer.wait(Duration::from_millis(30)).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_no_pacing_returns_immediately() {
        let start = Instant::now();
        NoPacing.wait(Duration::from_secs(60)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
