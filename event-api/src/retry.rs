use std::future::Future;

/// Terminal outcome of a bounded retry loop.
#[derive(Debug, PartialEq)]
pub enum RetryError<E> {
    /// The policy declared the error non-retryable; no further attempts ran.
    Fatal(E),
    /// The attempt budget ran out. Carries the final attempt's error.
    Exhausted(E),
}

/// Runs `op` up to `max_attempts` times, strictly sequentially and with no
/// delay between attempts.
///
/// `is_retryable` decides whether a failed attempt may be followed by
/// another; `on_failure` is invoked once for every non-terminal failure
/// (it never sees the error that ends the loop). A `max_attempts` of 0 is
/// treated as 1.
pub async fn attempt<T, E, F, Fut>(
    max_attempts: u32,
    mut op: F,
    is_retryable: impl Fn(&E) -> bool,
    mut on_failure: impl FnMut(u32, &E),
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt_no = 0;

    loop {
        attempt_no += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => return Err(RetryError::Fatal(err)),
            Err(err) if attempt_no >= max_attempts => return Err(RetryError::Exhausted(err)),
            Err(err) => on_failure(attempt_no, &err),
        }
    }
}
