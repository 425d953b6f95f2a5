//! Background task that listens on the remote-control topics.
//!
//! The receive loop subscribes to the versioned and unversioned topics of a
//! user, merges both into a single stream and decodes every message into a
//! [`Frame`]. Notifications update the device [`Registry`]; every frame is
//! logged at debug level. Messages that cannot be decoded are logged and
//! dropped, they never end the loop.
//!
//! The loop runs until the merged stream ends or its cancellation token is
//! cancelled. It checks the token between messages only, so a message that
//! is being handled is always handled completely.

use std::sync::Arc;

use futures_util::{stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    error::Result,
    mercury::{Response, Subscription},
    protocol::{Frame, MessageType, Topic},
    registry::Registry,
    session::Session,
};

/// Runs the receive loop for `username` until `shutdown` is cancelled.
pub(crate) async fn run(
    session: Arc<dyn Session>,
    username: String,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
) {
    let subscription = tokio::select! {
        biased;

        () = shutdown.cancelled() => return,
        result = subscribe(session.as_ref(), &username) => result,
    };

    let mut inbound = match subscription {
        Ok(inbound) => inbound,
        Err(e) => {
            error!("could not subscribe to remote topics of {username}: {e}");
            return;
        }
    };

    info!("listening for devices of {username}");

    loop {
        tokio::select! {
            // Prioritize shutdown over pending messages.
            biased;

            () = shutdown.cancelled() => {
                debug!("stopped listening for devices of {username}");
                break;
            }

            response = inbound.next() => {
                let Some(response) = response else {
                    info!("remote topics of {username} closed");
                    break;
                };

                handle_response(&registry, &response);
            }
        }
    }
}

/// Subscribes to all remote-control topics of `username` and merges them
/// into one stream.
async fn subscribe(session: &dyn Session, username: &str) -> Result<Subscription> {
    let mut subscriptions = Vec::new();
    for topic in Topic::subscriptions(username) {
        let uri = topic.to_string();
        debug!("subscribing to {uri}");
        subscriptions.push(session.subscribe(&uri).await?);
    }

    Ok(stream::select_all(subscriptions).boxed())
}

/// Decodes a single inbound message and folds it into `registry`.
pub(crate) fn handle_response(registry: &Registry, response: &Response) {
    let Some(payload) = response.payload.first() else {
        warn!("ignoring message without payload on {}", response.uri);
        return;
    };

    let extra_parts = response.payload.len() - 1;
    if extra_parts > 0 {
        trace!(
            "ignoring {extra_parts} trailing payload parts on {}",
            response.uri
        );
    }

    let frame = match Frame::decode(payload) {
        Ok(frame) => frame,
        Err(e) => {
            error!("error decoding frame on {}: {e}", response.uri);
            return;
        }
    };

    match frame.message_type {
        MessageType::Notify => registry.upsert(&frame.ident, frame.device_name()),

        MessageType::Hello
        | MessageType::Goodbye
        | MessageType::Probe
        | MessageType::Load
        | MessageType::Play
        | MessageType::Pause
        | MessageType::PlayPause
        | MessageType::Seek
        | MessageType::Prev
        | MessageType::Next
        | MessageType::Volume
        | MessageType::Shuffle
        | MessageType::Repeat
        | MessageType::VolumeDown
        | MessageType::VolumeUp
        | MessageType::Replace
        | MessageType::Logout
        | MessageType::Action
        | MessageType::Rename
        | MessageType::UpdateMetadata => {}
    }

    debug!("<- {frame}");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Mutex,
        thread::{self, ThreadId},
    };

    use log::{Level, LevelFilter, Log, Metadata, Record};
    use protobuf::{EnumOrUnknown, Message, MessageField};

    use super::*;
    use crate::protocol::{protos::spirc, DeviceState};

    /// Records debug lines per thread, so that parallel tests only see
    /// their own output.
    struct Capture {
        lines: Mutex<Vec<(ThreadId, String)>>,
    }

    static CAPTURE: Capture = Capture {
        lines: Mutex::new(Vec::new()),
    };

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= Level::Debug
        }

        fn log(&self, record: &Record<'_>) {
            if self.enabled(record.metadata()) {
                self.lines
                    .lock()
                    .unwrap()
                    .push((thread::current().id(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    fn captured_lines() -> Vec<String> {
        let id = thread::current().id();
        CAPTURE
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread, _)| *thread == id)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn response(payload: Vec<Vec<u8>>) -> Response {
        Response {
            uri: "hm://remote/user/alice/".to_owned(),
            payload,
        }
    }

    fn frame(ident: &str, name: &str, message_type: MessageType) -> Vec<u8> {
        Frame {
            device_state: Some(DeviceState {
                name: name.to_owned(),
                ..Default::default()
            }),
            ..Frame::new(ident, 1, message_type)
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn notify_registers_device() {
        let registry = Registry::new();
        handle_response(
            &registry,
            &response(vec![frame("X", "Kitchen", MessageType::Notify)]),
        );

        let devices = registry.list();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].ident, "X");
        assert_eq!(devices[0].name, "Kitchen");
        assert_eq!(devices[0].url, None);
    }

    #[test]
    fn other_frames_leave_registry_alone() {
        let registry = Registry::new();
        handle_response(
            &registry,
            &response(vec![frame("X", "Kitchen", MessageType::Hello)]),
        );
        handle_response(
            &registry,
            &response(vec![frame("X", "Kitchen", MessageType::Play)]),
        );

        assert!(registry.is_empty());
    }

    #[test]
    fn notify_with_unknown_play_status_registers_device() {
        let frame = spirc::Frame {
            ident: Some("X".to_owned()),
            typ: Some(EnumOrUnknown::new(spirc::MessageType::kMessageTypeNotify)),
            device_state: MessageField::some(spirc::DeviceState {
                name: Some("Kitchen".to_owned()),
                ..Default::default()
            }),
            state: MessageField::some(spirc::State {
                status: Some(EnumOrUnknown::from_i32(7)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let registry = Registry::new();
        handle_response(&registry, &response(vec![frame.write_to_bytes().unwrap()]));

        let devices = registry.list();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].ident, "X");
        assert_eq!(devices[0].name, "Kitchen");
    }

    #[test]
    fn every_frame_is_logged() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Debug);

        let registry = Registry::new();
        handle_response(
            &registry,
            &response(vec![frame("X", "Kitchen", MessageType::Play)]),
        );
        handle_response(
            &registry,
            &response(vec![frame("Y", "Bedroom", MessageType::Notify)]),
        );

        let frames: Vec<_> = captured_lines()
            .into_iter()
            .filter(|line| line.starts_with("<- "))
            .collect();
        assert_eq!(
            frames,
            [
                "<- Play Kitchen X 1 0 []".to_owned(),
                "<- Notify Bedroom Y 1 0 []".to_owned(),
            ]
        );
    }

    #[test]
    fn malformed_messages_are_dropped() {
        let registry = Registry::new();
        handle_response(&registry, &response(vec![]));
        handle_response(&registry, &response(vec![vec![0xff, 0xff, 0xff]]));
        assert!(registry.is_empty());

        handle_response(
            &registry,
            &response(vec![frame("Y", "Bedroom", MessageType::Notify)]),
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn only_first_payload_part_is_decoded() {
        let registry = Registry::new();
        handle_response(
            &registry,
            &response(vec![
                frame("X", "Kitchen", MessageType::Notify),
                frame("Y", "Bedroom", MessageType::Notify),
            ]),
        );

        let devices = registry.list();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].ident, "X");
    }
}
