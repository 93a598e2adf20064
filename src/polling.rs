//! Periodic Tasks
//!
//! Fixed-interval loop bound to a `CancellationToken`. The owning view
//! cancels the token when it is torn down and the loop exits right away.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{select, Either};
use tokio_util::sync::CancellationToken;

/// Sleep, then tick, until cancelled. Returns the number of ticks run.
/// Cancellation wakes the loop out of its sleep at once; a tick already
/// running finishes, and no new tick starts afterwards.
pub async fn run_polling<S, SF, T, TF>(interval: Duration, token: CancellationToken, mut sleep: S, mut tick: T) -> usize
where
    S: FnMut(Duration) -> SF,
    SF: Future<Output = ()>,
    T: FnMut() -> TF,
    TF: Future<Output = ()>,
{
    let mut ticks = 0;
    while !token.is_cancelled() {
        let nap = pin!(sleep(interval));
        let cancelled = pin!(token.cancelled());
        if let Either::Right(_) = select(nap, cancelled).await {
            break;
        }
        if token.is_cancelled() {
            break;
        }
        tick().await;
        ticks += 1;
    }
    ticks
}

/// Run [`run_polling`] on the browser event loop
pub fn spawn_polling<T, TF>(interval: Duration, token: CancellationToken, tick: T)
where
    T: FnMut() -> TF + 'static,
    TF: Future<Output = ()> + 'static,
{
    leptos::task::spawn_local(async move {
        let ticks = run_polling(interval, token, gloo_timers::future::sleep, tick).await;
        log::debug!("[POLL] stopped after {} ticks", ticks);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_stops_when_cancelled_during_sleep() {
        let token = CancellationToken::new();
        let sleeps = Rc::new(Cell::new(0));
        let ticks = run_polling(
            Duration::from_secs(5),
            token.clone(),
            |d| {
                assert_eq!(d, Duration::from_secs(5));
                sleeps.set(sleeps.get() + 1);
                if sleeps.get() == 3 {
                    token.cancel();
                }
                async {}
            },
            || async {},
        )
        .await;
        assert_eq!(ticks, 2);
        assert_eq!(sleeps.get(), 3);
    }

    #[tokio::test]
    async fn test_cancel_from_tick() {
        let token = CancellationToken::new();
        let count = Rc::new(Cell::new(0));
        let ticks = run_polling(
            Duration::from_millis(1),
            token.clone(),
            |_| async {},
            || {
                count.set(count.get() + 1);
                if count.get() == 4 {
                    token.cancel();
                }
                async {}
            },
        )
        .await;
        assert_eq!(ticks, 4);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let ticks = run_polling(Duration::from_secs(1), token, |_| async {}, || async {
            panic!("must not tick");
        })
        .await;
        assert_eq!(ticks, 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let token = CancellationToken::new();
        let (ticks, _) = tokio::join!(
            run_polling(
                Duration::from_secs(3600),
                token.clone(),
                |_| std::future::pending::<()>(),
                || async { panic!("must not tick") },
            ),
            async { token.cancel() },
        );
        assert_eq!(ticks, 0);
    }
}
