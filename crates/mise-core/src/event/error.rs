//! # Mise Core Event System Errors
use thiserror::Error;

use crate::event::EventId;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("No event handler registered with ID {id}")]
    HandlerNotFound { id: EventId },

    #[error("Event sink '{sink}' rejected event: {reason}")]
    SinkFailed { sink: String, reason: String },
}
