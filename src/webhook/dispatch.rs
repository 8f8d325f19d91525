//! Pushing decoded callbacks onto the event channel

use tokio::sync::mpsc::{self, error::TrySendError};

use super::OverflowPolicy;
use crate::models::Callback;

/// Why a batch could not be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The consumer dropped its receiver
    Closed,
    /// Not enough room for the whole batch under [`OverflowPolicy::Reject`]
    Full,
}

/// Deliver a batch in order, returning how many callbacks were queued
pub async fn dispatch(
    tx: &mpsc::Sender<Callback>,
    callbacks: Vec<Callback>,
    policy: OverflowPolicy,
) -> Result<usize, DispatchError> {
    if callbacks.is_empty() {
        return Ok(0);
    }

    match policy {
        OverflowPolicy::Block => {
            let count = callbacks.len();
            for callback in callbacks {
                tx.send(callback).await.map_err(|_| DispatchError::Closed)?;
            }
            Ok(count)
        }
        OverflowPolicy::DropNewest => {
            let mut sent = 0;
            let mut dropped = 0;
            for callback in callbacks {
                match tx.try_send(callback) {
                    Ok(()) => sent += 1,
                    Err(TrySendError::Full(_)) => dropped += 1,
                    Err(TrySendError::Closed(_)) => return Err(DispatchError::Closed),
                }
            }
            if dropped > 0 {
                tracing::warn!(sent, dropped, "event queue full, dropped callbacks");
            }
            Ok(sent)
        }
        OverflowPolicy::Reject => {
            // All or nothing
            if tx.is_closed() {
                return Err(DispatchError::Closed);
            }
            if callbacks.len() > tx.max_capacity() {
                return Err(DispatchError::Full);
            }
            let permits = tx.try_reserve_many(callbacks.len()).map_err(|e| match e {
                TrySendError::Full(()) => DispatchError::Full,
                TrySendError::Closed(()) => DispatchError::Closed,
            })?;
            let count = callbacks.len();
            for (permit, callback) in permits.zip(callbacks) {
                permit.send(callback);
            }
            Ok(count)
        }
    }
}
