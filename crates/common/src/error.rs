use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Signal channel closed: {controller} has no peer left")]
    SignalChannelClosed { controller: String },

    #[error("Control loop '{controller}' failed: {reason}")]
    LoopFailed { controller: String, reason: String },
}
