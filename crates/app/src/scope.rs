//! Lifetime of a rendered view.
//!
//! Work started by a view runs through its [`ViewScope`]. Once the view
//! goes away the scope is cancelled and pending work resolves to `None`,
//! so late responses never write into a view that no longer exists.
//! Writes settle on their own task (see [`AppContext::settle`]), so
//! cancelling a view never strands an optimistic cache entry.
//!
//! [`AppContext::settle`]: crate::AppContext::settle

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct ViewScope {
    cancel: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope of a nested view, cancelled together with its parent.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }

    /// Run `fut` unless the scope is cancelled first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }

    /// Cancel the scope once `signal` resolves, e.g. on Ctrl-C.
    pub fn cancel_on<S>(&self, signal: S)
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = signal => cancel.cancel(),
            }
        });
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
