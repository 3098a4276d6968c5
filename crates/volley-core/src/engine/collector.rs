use tokio::sync::mpsc;

use crate::results::RequestOutcome;

/// Create a connected collector / receiver pair for one run.
pub fn outcome_channel() -> (ResultCollector, OutcomeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultCollector { tx }, OutcomeReceiver { rx })
}

/// Append-only outcome sink shared by all workers of a run.
///
/// Submissions from concurrent workers are serialized by the channel; each
/// submission is atomic and an accepted outcome is never dropped. The final
/// order is completion order across workers, not issuance order.
#[derive(Clone)]
pub struct ResultCollector {
    tx: mpsc::UnboundedSender<RequestOutcome>,
}

impl ResultCollector {
    /// Record one completed call.
    ///
    /// A send can only fail once the receiving half is gone, which the
    /// controller guarantees not to drop before every worker has finished.
    pub fn submit(&self, outcome: RequestOutcome) {
        let _ = self.tx.send(outcome);
    }
}

/// Receiving half held by the run controller.
pub struct OutcomeReceiver {
    rx: mpsc::UnboundedReceiver<RequestOutcome>,
}

impl OutcomeReceiver {
    /// Collect every submitted outcome in completion order.
    ///
    /// Returns once all [`ResultCollector`] clones have been dropped; no
    /// submission can race the returned snapshot.
    pub async fn drain(mut self) -> Vec<RequestOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}
