//! Defines the channel messages between the web server (and the status
//! poller) and the task owning the stats tracker.

use tokio::sync::{mpsc, oneshot};

use crate::print_stats::{JobOutcome, PrintStats, StatsError, StatusSnapshot};

type Reply = oneshot::Sender<Result<String, StatsError>>;

/// A request sent from a web handler or the status poller to the tracker
/// task.
#[derive(Debug)]
pub enum StatsRequest {
    /// Read the current status snapshot.
    GetStatus {
        respond_to: oneshot::Sender<StatusSnapshot>,
    },
    /// Begin a new job or resume a paused one.
    Start { respond_to: Reply },
    /// Freeze accounting without ending the job.
    Pause { respond_to: Reply },
    /// End the job with the given outcome.
    Terminate {
        outcome: JobOutcome,
        message: Option<String>,
        respond_to: Reply,
    },
    /// Zero all accumulators and return to standby.
    Reset {
        filename: Option<String>,
        respond_to: Reply,
    },
}

/// Serve requests against the tracker until every sender is dropped.
///
/// The task running this loop is the sole owner of the tracker, so reads
/// never interleave with transitions: one request is processed fully
/// before the next is taken off the channel.
pub async fn serve(mut tracker: PrintStats, mut requests: mpsc::Receiver<StatsRequest>) {
    while let Some(request) = requests.recv().await {
        match request {
            StatsRequest::GetStatus { respond_to } => {
                let _ = respond_to.send(tracker.status_now());
            }
            StatsRequest::Start { respond_to } => {
                let _ = respond_to.send(tracker.notify_start());
            }
            StatsRequest::Pause { respond_to } => {
                let _ = respond_to.send(tracker.notify_pause());
            }
            StatsRequest::Terminate {
                outcome,
                message,
                respond_to,
            } => {
                let _ = respond_to.send(tracker.notify_terminate(outcome, message));
            }
            StatsRequest::Reset {
                filename,
                respond_to,
            } => {
                let _ = respond_to.send(tracker.notify_reset(filename.as_deref()));
            }
        }
    }
}
