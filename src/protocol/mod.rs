//! Protocol types for the Spirc remote-control protocol.
//!
//! Spirc frames travel over Mercury, a publish/subscribe transport, on
//! topics scoped by username. This module contains everything needed to
//! speak the protocol without touching the transport:
//!
//! # Submodules
//!
//! * [`frame`] - Strongly-typed frames and their wire encoding
//! * [`gid`] - Conversion of base62 track ids to their binary form
//! * [`protos`] - Generated protocol buffer messages
//! * [`topic`] - Mercury topic naming
//!
//! # Usage Example
//!
//! ```
//! use spotcontrol::protocol::{Frame, MessageType, Topic};
//!
//! let frame = Frame::new("controller-ident", 1, MessageType::Hello);
//! let topic = Topic::remote("username");
//!
//! // Bytes to publish on `hm://remote/user/username/`
//! let payload = frame.encode()?;
//! ```

pub mod frame;
pub mod gid;
pub mod protos;
pub mod topic;

pub use frame::{DeviceState, Frame, MessageType, State, Status, TrackRef};
pub use gid::Gid;
pub use topic::Topic;
