//! Error taxonomy shared by the registries and the control surface.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Unknown device, slot or mapping name. Nothing was changed.
    #[error("'{0}' did not match any known {1}")]
    InvalidReference(String, &'static str),

    /// No free slot of the needed category.
    #[error("no open slot for {0}")]
    ResourceExhausted(String),

    /// The driver layer failed while reading or opening a device.
    #[error("controller I/O error: {0}")]
    HardwareIo(#[source] io::Error),

    /// LED or interface toggle refused by the system.
    #[error("permission problem: {0}")]
    Permission(#[source] io::Error),

    /// Built-in mapping, slot 0, or a colliding name.
    #[error("'{0}' is protected: {1}")]
    ProtectedResource(String, &'static str),

    #[error("invalid name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("usage: {0}")]
    Usage(&'static str),

    /// Device skipped by policy (e.g. --ignore-pro).
    #[error("device {0} ignored")]
    Ignored(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
