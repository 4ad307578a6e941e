#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    OsSigInt,
    OsSigQuit,
    OsSigTerm,
    UserInt,
}

/// After this many signals we stop waiting for a graceful shutdown.
const FORCE_QUIT_THRESHOLD: u8 = 3;

/// The receiving side of the shutdown broadcast.
#[derive(Debug)]
pub struct InterruptReceiver {
    interrupt_rx: broadcast::Receiver<Interrupted>,
}

impl InterruptReceiver {
    #[must_use]
    #[inline]
    pub const fn new(interrupt_rx: broadcast::Receiver<Interrupted>) -> Self {
        Self { interrupt_rx }
    }

    /// Wait for an interrupt signal to be received.
    ///
    /// # Errors
    ///
    /// Fails if the interrupt signal cannot be received (e.g. the sender has been dropped)
    #[inline]
    pub async fn wait(&mut self) -> Result<Interrupted, broadcast::error::RecvError> {
        self.interrupt_rx.recv().await
    }
}

/// The sending side of the shutdown broadcast.
#[derive(Debug, Clone)]
pub struct Terminator {
    interrupt_tx: broadcast::Sender<Interrupted>,
}

impl Terminator {
    #[must_use]
    #[inline]
    pub const fn new(interrupt_tx: broadcast::Sender<Interrupted>) -> Self {
        Self { interrupt_tx }
    }

    /// Ask everything listening to shut down.
    ///
    /// # Errors
    ///
    /// Fails if nothing is listening anymore.
    #[inline]
    pub fn terminate(&self, interrupted: Interrupted) -> anyhow::Result<()> {
        self.interrupt_tx.send(interrupted)?;

        Ok(())
    }
}

/// Forward a signal, forcefully exiting once too many have arrived.
fn forward(terminator: &Terminator, interrupted: Interrupted, kill_count: &mut u8) {
    if let Err(e) = terminator.terminate(interrupted) {
        log::warn!("failed to forward {interrupted:?}: {e}");
    }
    *kill_count += 1;

    if *kill_count >= FORCE_QUIT_THRESHOLD {
        log::warn!("Received {FORCE_QUIT_THRESHOLD} signals, forcefully terminating the application");
        std::process::exit(1);
    }
}

#[cfg(unix)]
async fn terminate_by_signal(terminator: Terminator) {
    let streams = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    );
    let (Ok(mut interrupt_signal), Ok(mut term_signal), Ok(mut quit_signal)) = streams else {
        log::error!("Unable to listen for signals, only ctrl-c will stop the server");
        return terminate_by_ctrl_c(terminator).await;
    };

    let mut kill_count = 0;

    loop {
        tokio::select! {
            _ = interrupt_signal.recv() => forward(&terminator, Interrupted::OsSigInt, &mut kill_count),
            _ = term_signal.recv() => forward(&terminator, Interrupted::OsSigTerm, &mut kill_count),
            _ = quit_signal.recv() => forward(&terminator, Interrupted::OsSigQuit, &mut kill_count),
            _ = tokio::signal::ctrl_c() => forward(&terminator, Interrupted::UserInt, &mut kill_count),
        }
    }
}

#[cfg(not(unix))]
async fn terminate_by_signal(terminator: Terminator) {
    terminate_by_ctrl_c(terminator).await;
}

async fn terminate_by_ctrl_c(terminator: Terminator) {
    let mut kill_count = 0;

    while tokio::signal::ctrl_c().await.is_ok() {
        forward(&terminator, Interrupted::UserInt, &mut kill_count);
    }
}

/// Create the shutdown broadcast, with a thread forwarding OS signals into it.
///
/// # Errors
///
/// Fails if the signal thread's runtime can't be built.
#[allow(clippy::module_name_repetitions)]
#[inline]
pub fn create_termination() -> std::io::Result<(Terminator, InterruptReceiver)> {
    let (terminator, interrupt) = channel();

    // runtime for the terminator
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .thread_name("spotlite-terminator")
        .build()?;
    let terminator_clone = terminator.clone();

    std::thread::spawn(move || {
        rt.block_on(terminate_by_signal(terminator_clone));
    });

    Ok((terminator, interrupt))
}

/// A shutdown broadcast that only fires when told to.
#[must_use]
#[inline]
pub fn channel() -> (Terminator, InterruptReceiver) {
    let (tx, rx) = broadcast::channel(2);
    (Terminator::new(tx), InterruptReceiver::new(rx))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[timeout(Duration::from_secs(1))]
    #[tokio::test]
    async fn test_terminate() {
        let (terminator, mut rx) = create_termination().unwrap();

        terminator
            .terminate(Interrupted::UserInt)
            .expect("failed to send interrupt signal");

        assert_eq!(rx.wait().await, Ok(Interrupted::UserInt));
    }

    #[rstest]
    #[timeout(Duration::from_secs(1))]
    #[tokio::test]
    async fn test_wait_fails_once_the_sender_is_gone() {
        let (terminator, mut rx) = channel();
        drop(terminator);

        assert!(rx.wait().await.is_err());
    }
}
