//! Shared helpers for concurrency-heavy unit tests.

/// Run `action` from 100 worker threads, 1000 times each, passing a global
/// iteration index in `0..100_000`. Returns once every worker has finished.
pub(crate) fn massive_run<F>(action: F)
where
    F: Fn(usize) + Send + Sync,
{
    const WORKERS: usize = 100;
    const REPEATS: usize = 1000;

    std::thread::scope(|scope| {
        for worker in 0..WORKERS {
            let action = &action;
            scope.spawn(move || {
                for i in 0..REPEATS {
                    action(i + REPEATS * worker);
                }
            });
        }
    });
}
