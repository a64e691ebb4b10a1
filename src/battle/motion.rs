//! Completion tracking for in-flight walk animations
//!
//! The visual layer receives one `MotionRecord` per walker and calls
//! `complete()` when that walker arrives. The orchestrator awaits the matching
//! `MotionJoin`, bounded by a hard timeout so a lost animation can never stall
//! a cycle. Dropping a record counts as completion.

use std::time::Duration;

use tokio::sync::oneshot;

/// One walker's completion signal
#[derive(Debug)]
pub struct MotionRecord {
    index: usize,
    done: oneshot::Sender<()>,
}

impl MotionRecord {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn complete(self) {
        // receiver gone means the join already gave up
        let _ = self.done.send(());
    }
}

/// Resolves once every record of its set has completed
#[derive(Debug)]
pub struct MotionJoin {
    pending: Vec<oneshot::Receiver<()>>,
}

/// Outcome of waiting on a `MotionJoin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    AllArrived,
    TimedOut,
}

impl MotionJoin {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for all records, giving up after `limit`
    pub async fn wait(self, limit: Duration) -> JoinOutcome {
        let count = self.pending.len();
        let all = async move {
            for rx in self.pending {
                // Err means the record was dropped, which is also an arrival
                let _ = rx.await;
            }
        };

        match tokio::time::timeout(limit, all).await {
            Ok(()) => JoinOutcome::AllArrived,
            Err(_) => {
                tracing::warn!("{} walk animation(s) did not finish within {:?}", count, limit);
                JoinOutcome::TimedOut
            }
        }
    }
}

/// Factory for a fixed number of linked records and their join
pub struct MotionSet;

impl MotionSet {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(count: usize) -> (Vec<MotionRecord>, MotionJoin) {
        let (records, pending) = (0..count)
            .map(|index| {
                let (done, rx) = oneshot::channel();
                (MotionRecord { index, done }, rx)
            })
            .unzip();
        (records, MotionJoin { pending })
    }
}
