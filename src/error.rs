//! Error type shared by the protocol, view and channel layers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An inbound event name outside the channel contract.
    #[error("unknown inbound event '{0}'")]
    UnknownEvent(String),

    /// An inbound payload that does not decode into the event's type.
    #[error("invalid payload for '{event}': {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// A move was requested before the server assigned a player identity.
    #[error("player identity has not been assigned yet")]
    IdentityUnassigned,

    /// A transcript line that is neither channel traffic nor user input.
    #[error("unrecognised transcript line: {0}")]
    Transcript(String),

    #[error("failed to encode outbound payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
