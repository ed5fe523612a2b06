use std::collections::BTreeMap;

use crate::error::TransportError;

/// Datapoint id → value map, as carried in a device reply.
///
/// Values are heterogeneous JSON scalars on the wire (the install reply is a
/// base64 string, volume is a number, other datapoints are booleans), so
/// they stay as [`serde_json::Value`] here.
pub type DpMap = BTreeMap<u32, serde_json::Value>;

/// Capability interface to an already-established local device session.
///
/// Implementations own the session: encryption, socket lifecycle, retries,
/// timeouts. Two contract points matter to the push flow:
///
/// - A send that gets no reply in time returns an `Ok` map *without* the
///   requested datapoint, never an error. Errors mean the session itself is
///   unusable.
/// - Calls block until the device answers or the implementation gives up.
pub trait DeviceTransport {
    /// Write `value` to datapoint `dp` and return the device's reply map.
    fn set_value(&mut self, dp: u32, value: &str) -> Result<DpMap, TransportError>;

    /// Read the device's full status map.
    fn status(&mut self) -> Result<DpMap, TransportError>;
}
