//! Spirc frames: the unit of exchange between controllers and devices.
//!
//! On the wire, a frame is a protocol buffer message (see
//! [`protos::spirc`](super::protos::spirc)). This module defines the
//! strongly-typed [`Frame`] that the rest of the crate works with, and the
//! conversions to and from the generated types.
//!
//! Enumerations are closed: a frame carrying a message type this crate does
//! not know about fails to decode, instead of surfacing as a raw integer. An
//! embedded state with an unknown play status is dropped from the frame.
//!
//! # Example
//!
//! ```rust
//! use spotcontrol::protocol::{Frame, MessageType};
//!
//! let frame = Frame::new("controller-ident", 1, MessageType::Hello);
//! let bytes = frame.encode()?;
//! assert_eq!(Frame::decode(&bytes)?, frame);
//! ```

use std::fmt;

use protobuf::{EnumOrUnknown, Message, MessageField};

use super::{protos::spirc, Gid};
use crate::error::{Error, Result};

/// A Spirc frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame format version.
    pub version: u32,

    /// Identity of the sending device.
    pub ident: String,

    /// Protocol generation of the sender.
    pub protocol_version: String,

    /// Sequence number, increasing with every frame a sender sends.
    pub seq_nr: u32,

    /// Kind of message.
    pub message_type: MessageType,

    /// Devices this frame is addressed to. Empty means: everyone listening.
    pub recipients: Vec<String>,

    /// Playback state, for example the tracks to load.
    pub state: Option<State>,

    /// Status of the sender, present on notifications.
    pub device_state: Option<DeviceState>,

    /// Identifier of the state update that triggered this frame.
    pub state_update_id: Option<i64>,
}

/// Kinds of Spirc messages.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageType {
    Hello,
    Goodbye,
    Probe,
    /// Presence and status announcement of a device.
    Notify,
    /// Replace the playback queue of the recipient.
    Load,
    Play,
    Pause,
    PlayPause,
    Seek,
    Prev,
    Next,
    Volume,
    Shuffle,
    Repeat,
    VolumeDown,
    VolumeUp,
    Replace,
    Logout,
    Action,
    Rename,
    UpdateMetadata,
}

/// Playback state carried by a [`Frame`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    /// Position in the track list.
    pub index: u32,

    /// Tracks in playback order.
    pub tracks: Vec<TrackRef>,

    pub status: Status,

    /// Index of the track that is currently playing.
    pub playing_track_index: u32,
}

/// A reference to a single track in a [`State`].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct TrackRef {
    pub gid: Gid,

    /// Whether the track was explicitly queued by the user.
    pub queued: bool,
}

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    #[default]
    Stop,
    Play,
    Pause,
    Loading,
}

/// Status that a device reports about itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceState {
    /// Display name. Empty when the device did not send one.
    pub name: String,
    pub sw_version: Option<String>,
    pub is_active: Option<bool>,
    pub can_play: Option<bool>,
    pub volume: Option<u32>,
}

impl Frame {
    /// Frame format version this crate sends.
    pub const VERSION: u32 = 1;

    /// Protocol generation this crate speaks.
    pub const PROTOCOL_VERSION: &'static str = "2.0.0";

    /// Creates a broadcast frame without state.
    #[must_use]
    pub fn new(ident: impl Into<String>, seq_nr: u32, message_type: MessageType) -> Self {
        Self {
            version: Self::VERSION,
            ident: ident.into(),
            protocol_version: Self::PROTOCOL_VERSION.to_owned(),
            seq_nr,
            message_type,
            recipients: Vec::new(),
            state: None,
            device_state: None,
            state_update_id: None,
        }
    }

    /// Returns the display name of the sender, or an empty string if the
    /// frame carries none.
    #[must_use]
    pub fn device_name(&self) -> &str {
        self.device_state
            .as_ref()
            .map_or("", |device_state| device_state.name.as_str())
    }

    /// Serializes this frame to its wire format.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the frame cannot be serialized.
    pub fn encode(&self) -> Result<Vec<u8>> {
        spirc::Frame::from(self).write_to_bytes().map_err(|e| {
            Error::internal(format!(
                "could not encode {} frame {}: {e}",
                self.message_type, self.seq_nr
            ))
        })
    }

    /// Parses a frame from its wire format.
    ///
    /// # Errors
    ///
    /// Returns `DataLoss` if `bytes` is not a valid frame, or if the frame
    /// has no message type or an unknown message type.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let frame = spirc::Frame::parse_from_bytes(bytes)
            .map_err(|e| Error::data_loss(format!("could not decode frame: {e}")))?;
        Self::try_from(frame)
    }
}

impl State {
    /// Creates a stopped state that starts at the first of `tracks`.
    #[must_use]
    pub fn load(tracks: Vec<TrackRef>) -> Self {
        Self {
            index: 0,
            tracks,
            status: Status::Stop,
            playing_track_index: 0,
        }
    }
}

impl TrackRef {
    /// Creates a reference to a track that is played directly, not queued.
    #[must_use]
    pub fn new(gid: Gid) -> Self {
        Self { gid, queued: false }
    }
}

/// Formats a frame as a single diagnostic line:
/// `type name ident seq_nr state_update_id [recipients]`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {:?}",
            self.message_type,
            self.device_name(),
            self.ident,
            self.seq_nr,
            self.state_update_id.unwrap_or_default(),
            self.recipients,
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<MessageType> for spirc::MessageType {
    fn from(message_type: MessageType) -> Self {
        match message_type {
            MessageType::Hello => Self::kMessageTypeHello,
            MessageType::Goodbye => Self::kMessageTypeGoodbye,
            MessageType::Probe => Self::kMessageTypeProbe,
            MessageType::Notify => Self::kMessageTypeNotify,
            MessageType::Load => Self::kMessageTypeLoad,
            MessageType::Play => Self::kMessageTypePlay,
            MessageType::Pause => Self::kMessageTypePause,
            MessageType::PlayPause => Self::kMessageTypePlayPause,
            MessageType::Seek => Self::kMessageTypeSeek,
            MessageType::Prev => Self::kMessageTypePrev,
            MessageType::Next => Self::kMessageTypeNext,
            MessageType::Volume => Self::kMessageTypeVolume,
            MessageType::Shuffle => Self::kMessageTypeShuffle,
            MessageType::Repeat => Self::kMessageTypeRepeat,
            MessageType::VolumeDown => Self::kMessageTypeVolumeDown,
            MessageType::VolumeUp => Self::kMessageTypeVolumeUp,
            MessageType::Replace => Self::kMessageTypeReplace,
            MessageType::Logout => Self::kMessageTypeLogout,
            MessageType::Action => Self::kMessageTypeAction,
            MessageType::Rename => Self::kMessageTypeRename,
            MessageType::UpdateMetadata => Self::kMessageTypeUpdateMetadata,
        }
    }
}

impl From<spirc::MessageType> for MessageType {
    fn from(message_type: spirc::MessageType) -> Self {
        match message_type {
            spirc::MessageType::kMessageTypeHello => Self::Hello,
            spirc::MessageType::kMessageTypeGoodbye => Self::Goodbye,
            spirc::MessageType::kMessageTypeProbe => Self::Probe,
            spirc::MessageType::kMessageTypeNotify => Self::Notify,
            spirc::MessageType::kMessageTypeLoad => Self::Load,
            spirc::MessageType::kMessageTypePlay => Self::Play,
            spirc::MessageType::kMessageTypePause => Self::Pause,
            spirc::MessageType::kMessageTypePlayPause => Self::PlayPause,
            spirc::MessageType::kMessageTypeSeek => Self::Seek,
            spirc::MessageType::kMessageTypePrev => Self::Prev,
            spirc::MessageType::kMessageTypeNext => Self::Next,
            spirc::MessageType::kMessageTypeVolume => Self::Volume,
            spirc::MessageType::kMessageTypeShuffle => Self::Shuffle,
            spirc::MessageType::kMessageTypeRepeat => Self::Repeat,
            spirc::MessageType::kMessageTypeVolumeDown => Self::VolumeDown,
            spirc::MessageType::kMessageTypeVolumeUp => Self::VolumeUp,
            spirc::MessageType::kMessageTypeReplace => Self::Replace,
            spirc::MessageType::kMessageTypeLogout => Self::Logout,
            spirc::MessageType::kMessageTypeAction => Self::Action,
            spirc::MessageType::kMessageTypeRename => Self::Rename,
            spirc::MessageType::kMessageTypeUpdateMetadata => Self::UpdateMetadata,
        }
    }
}

impl From<Status> for spirc::PlayStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Stop => Self::kPlayStatusStop,
            Status::Play => Self::kPlayStatusPlay,
            Status::Pause => Self::kPlayStatusPause,
            Status::Loading => Self::kPlayStatusLoading,
        }
    }
}

impl From<spirc::PlayStatus> for Status {
    fn from(status: spirc::PlayStatus) -> Self {
        match status {
            spirc::PlayStatus::kPlayStatusStop => Self::Stop,
            spirc::PlayStatus::kPlayStatusPlay => Self::Play,
            spirc::PlayStatus::kPlayStatusPause => Self::Pause,
            spirc::PlayStatus::kPlayStatusLoading => Self::Loading,
        }
    }
}

impl From<&Frame> for spirc::Frame {
    fn from(frame: &Frame) -> Self {
        Self {
            version: Some(frame.version),
            ident: Some(frame.ident.clone()),
            protocol_version: Some(frame.protocol_version.clone()),
            seq_nr: Some(frame.seq_nr),
            typ: Some(EnumOrUnknown::new(frame.message_type.into())),
            recipient: frame.recipients.clone(),
            state: MessageField::from_option(frame.state.as_ref().map(spirc::State::from)),
            device_state: MessageField::from_option(
                frame.device_state.as_ref().map(spirc::DeviceState::from),
            ),
            state_update_id: frame.state_update_id,
            ..Default::default()
        }
    }
}

impl From<&State> for spirc::State {
    fn from(state: &State) -> Self {
        Self {
            index: Some(state.index),
            track: state.tracks.iter().map(spirc::TrackRef::from).collect(),
            status: Some(EnumOrUnknown::new(state.status.into())),
            playing_track_index: Some(state.playing_track_index),
            ..Default::default()
        }
    }
}

impl From<&TrackRef> for spirc::TrackRef {
    fn from(track: &TrackRef) -> Self {
        Self {
            gid: Some(track.gid.to_vec()),
            queued: Some(track.queued),
            ..Default::default()
        }
    }
}

impl From<&DeviceState> for spirc::DeviceState {
    fn from(device_state: &DeviceState) -> Self {
        Self {
            name: Some(device_state.name.clone()),
            sw_version: device_state.sw_version.clone(),
            is_active: device_state.is_active,
            can_play: device_state.can_play,
            volume: device_state.volume,
            ..Default::default()
        }
    }
}

impl TryFrom<spirc::Frame> for Frame {
    type Error = Error;

    fn try_from(frame: spirc::Frame) -> std::result::Result<Self, Self::Error> {
        let message_type = frame
            .typ
            .ok_or_else(|| Error::data_loss("frame should have a message type"))?
            .enum_value()
            .map_err(|n| Error::data_loss(format!("unknown message type {n}")))?
            .into();

        let state = frame
            .state
            .into_option()
            .and_then(|state| match State::try_from(state) {
                Ok(state) => Some(state),
                Err(e) => {
                    trace!("skipping frame state: {e}");
                    None
                }
            });
        let device_state = frame.device_state.into_option().map(DeviceState::from);

        Ok(Self {
            version: frame.version.unwrap_or_default(),
            ident: frame.ident.unwrap_or_default(),
            protocol_version: frame.protocol_version.unwrap_or_default(),
            seq_nr: frame.seq_nr.unwrap_or_default(),
            message_type,
            recipients: frame.recipient,
            state,
            device_state,
            state_update_id: frame.state_update_id,
        })
    }
}

impl TryFrom<spirc::State> for State {
    type Error = Error;

    fn try_from(state: spirc::State) -> std::result::Result<Self, Self::Error> {
        let status = state
            .status
            .map(|status| status.enum_value())
            .transpose()
            .map_err(|n| Error::data_loss(format!("unknown play status {n}")))?
            .map(Status::from)
            .unwrap_or_default();

        // Devices may reference tracks by URI only; those carry no gid.
        let tracks = state
            .track
            .iter()
            .filter_map(|track| match Gid::try_from(track.gid()) {
                Ok(gid) => Some(TrackRef {
                    gid,
                    queued: track.queued(),
                }),
                Err(e) => {
                    trace!("skipping track reference: {e}");
                    None
                }
            })
            .collect();

        Ok(Self {
            index: state.index.unwrap_or_default(),
            tracks,
            status,
            playing_track_index: state.playing_track_index.unwrap_or_default(),
        })
    }
}

impl From<spirc::DeviceState> for DeviceState {
    fn from(device_state: spirc::DeviceState) -> Self {
        Self {
            name: device_state.name.unwrap_or_default(),
            sw_version: device_state.sw_version,
            is_active: device_state.is_active,
            can_play: device_state.can_play,
            volume: device_state.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notify(ident: &str, name: &str) -> Frame {
        Frame {
            device_state: Some(DeviceState {
                name: name.to_owned(),
                is_active: Some(true),
                volume: Some(32_768),
                ..Default::default()
            }),
            state_update_id: Some(1_700_000_000_000),
            ..Frame::new(ident, 7, MessageType::Notify)
        }
    }

    #[test]
    fn preserves_load_frame() {
        let gid = Gid::from_base62("4uLU6hMCjMI75M1A2tKUQC").unwrap();
        let frame = Frame {
            recipients: vec!["kitchen".to_owned()],
            state: Some(State::load(vec![TrackRef::new(gid), TrackRef::new(gid)])),
            ..Frame::new("controller", 3, MessageType::Load)
        };

        let decoded = Frame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.protocol_version, "2.0.0");
    }

    #[test]
    fn decodes_notify_frame() {
        let frame = Frame::decode(&notify("X", "Kitchen").encode().unwrap()).unwrap();
        assert_eq!(frame.message_type, MessageType::Notify);
        assert_eq!(frame.device_name(), "Kitchen");
        assert_eq!(frame.ident, "X");
    }

    #[test]
    fn tolerates_missing_fields() {
        let frame = spirc::Frame {
            typ: Some(EnumOrUnknown::new(spirc::MessageType::kMessageTypeNotify)),
            ..Default::default()
        };

        let frame = Frame::decode(&frame.write_to_bytes().unwrap()).unwrap();
        assert_eq!(frame.ident, "");
        assert_eq!(frame.device_name(), "");
        assert_eq!(frame.seq_nr, 0);
        assert!(frame.recipients.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let err = Frame::decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DataLoss);
    }

    #[test]
    fn rejects_unknown_message_type() {
        let frame = spirc::Frame {
            ident: Some("X".to_owned()),
            typ: Some(EnumOrUnknown::from_i32(99)),
            ..Default::default()
        };

        let err = Frame::decode(&frame.write_to_bytes().unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DataLoss);
    }

    #[test]
    fn drops_state_with_unknown_play_status() {
        let frame = spirc::Frame {
            ident: Some("X".to_owned()),
            typ: Some(EnumOrUnknown::new(spirc::MessageType::kMessageTypeNotify)),
            state: MessageField::some(spirc::State {
                status: Some(EnumOrUnknown::from_i32(7)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let frame = Frame::decode(&frame.write_to_bytes().unwrap()).unwrap();
        assert_eq!(frame.message_type, MessageType::Notify);
        assert_eq!(frame.ident, "X");
        assert_eq!(frame.state, None);
    }

    #[test]
    fn rejects_missing_message_type() {
        let frame = spirc::Frame {
            ident: Some("X".to_owned()),
            ..Default::default()
        };

        assert!(Frame::decode(&frame.write_to_bytes().unwrap()).is_err());
    }

    #[test]
    fn skips_tracks_without_gid() {
        let frame = spirc::Frame {
            typ: Some(EnumOrUnknown::new(spirc::MessageType::kMessageTypeNotify)),
            state: MessageField::some(spirc::State {
                status: Some(EnumOrUnknown::new(spirc::PlayStatus::kPlayStatusPlay)),
                track: vec![
                    spirc::TrackRef {
                        uri: Some("spotify:track:4uLU6hMCjMI75M1A2tKUQC".to_owned()),
                        ..Default::default()
                    },
                    spirc::TrackRef {
                        gid: Some(vec![1; Gid::SIZE]),
                        queued: Some(true),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };

        let frame = Frame::decode(&frame.write_to_bytes().unwrap()).unwrap();
        let state = frame.state.unwrap();
        assert_eq!(state.status, Status::Play);
        assert_eq!(state.tracks.len(), 1);
        assert!(state.tracks[0].queued);
    }

    #[test]
    fn displays_diagnostic_line() {
        let frame = Frame {
            recipients: vec!["a".to_owned(), "b".to_owned()],
            ..notify("X", "Kitchen")
        };
        assert_eq!(
            frame.to_string(),
            r#"Notify Kitchen X 7 1700000000000 ["a", "b"]"#
        );
    }
}
