//! Runtime helpers for spawning the background loops owned by a multiplexer.

use std::future::Future;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

/// Spawns `run_loop` on the ambient tokio runtime, handing it the receiver it
/// drains.
///
/// The returned handle is owned by whoever must stop the loop; aborting it
/// drops the receiver.
pub(crate) fn spawn_receive_loop<M, F, Fut>(receiver: Receiver<M>, run_loop: F) -> JoinHandle<()>
where
    M: Send + 'static,
    F: FnOnce(Receiver<M>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(run_loop(receiver))
}
