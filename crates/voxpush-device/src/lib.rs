//! Device-side push flow for voice pack installs.
//!
//! Wraps the wire codec with everything that touches the appliance: the
//! datapoint ids it exposes, the capability trait an (external) local
//! transport session implements, the known-version advisory table, and the
//! state machine that turns a device reply into a confirmation.
//!
//! This crate never opens a connection itself. Callers inject a
//! [`DeviceTransport`]; session setup, encryption, and retry policy all live
//! behind that trait.

pub mod dp;
pub mod error;
pub mod install;
pub mod transport;

pub use error::{DeviceError, Result, TransportError};
pub use install::{
    push_pack, InstallState, KnownVersions, PushOptions, PushOutcome, PushReport,
    VersionAdvisory,
};
pub use transport::{DeviceTransport, DpMap};
