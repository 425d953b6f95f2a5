//! Remote control of Spirc playback devices.
//!
//! A [`Controller`] announces itself on the remote-control topics of a user,
//! keeps track of the devices that notify on them and sends them playback
//! commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use spotcontrol::{config::Config, remote::Controller};
//!
//! let controller = Controller::new(Arc::clone(&session), &Config::with_username("alice"))?;
//! controller.send_hello().await?;
//!
//! for device in controller.list_devices() {
//!     println!("{} ({})", device.name, device.ident);
//! }
//!
//! controller.load_track(&device.ident, ["4uLU6hMCjMI75M1A2tKUQC"]).await?;
//! controller.send_play(&device.ident).await?;
//! ```

use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::{Error, Result},
    mercury::{Method, Request},
    protocol::{Frame, Gid, MessageType, State, Topic, TrackRef},
    receiver,
    registry::{Device, Registry},
    sequence::Sequence,
    session::Session,
};

/// Controller of the playback devices of one user.
///
/// Creating a controller starts a background task that listens for device
/// notifications. The task runs until [`stop`](Self::stop) is called or the
/// controller is dropped.
pub struct Controller {
    session: Arc<dyn Session>,

    ident: String,
    username: String,

    /// Guards both sequence number assignment and sending, so that frames
    /// go out in sequence number order.
    sequence: Mutex<Sequence>,

    devices: Arc<Registry>,

    shutdown: CancellationToken,
    receiver: Option<JoinHandle<()>>,
}

impl Controller {
    /// Creates a controller on `session` and starts listening for devices.
    ///
    /// The username is taken from `config`, or from the session login if
    /// `config` has none.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if no username is configured and the
    /// session does not know the login username either.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new<S>(session: Arc<S>, config: &Config) -> Result<Self>
    where
        S: Session,
    {
        let session: Arc<dyn Session> = session;

        let username = config
            .username
            .clone()
            .filter(|username| !username.is_empty())
            .or_else(|| session.login_username())
            .filter(|username| !username.is_empty())
            .ok_or_else(|| {
                Error::invalid_argument("username should be configured or known to the session")
            })?;

        let ident = config.device_id.clone();
        debug!("controller {ident} for user {username}");

        let devices = Arc::new(Registry::new());
        let shutdown = CancellationToken::new();
        let receiver = tokio::spawn(receiver::run(
            Arc::clone(&session),
            username.clone(),
            Arc::clone(&devices),
            shutdown.clone(),
        ));

        Ok(Self {
            session,
            ident,
            username,
            sequence: Mutex::new(Sequence::new()),
            devices,
            shutdown,
            receiver: Some(receiver),
        })
    }

    /// Identity this controller sends frames as.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// User whose devices this controller controls.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Announces this controller to all devices of the user.
    pub async fn send_hello(&self) -> Result<()> {
        self.send_frame(MessageType::Hello, Vec::new(), None).await
    }

    /// Resumes playback on the device `ident`.
    pub async fn send_play(&self, ident: &str) -> Result<()> {
        self.send_frame(MessageType::Play, vec![ident.to_owned()], None)
            .await
    }

    /// Pauses playback on the device `ident`.
    pub async fn send_pause(&self, ident: &str) -> Result<()> {
        self.send_frame(MessageType::Pause, vec![ident.to_owned()], None)
            .await
    }

    /// Replaces the queue of the device `ident` with `track_ids`, stopped at
    /// the first track.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any of `track_ids` is not a valid base62
    /// track id. Nothing is sent in that case.
    pub async fn load_track<I, T>(&self, ident: &str, track_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let tracks = track_ids
            .into_iter()
            .map(|id| Gid::from_base62(id.as_ref()).map(TrackRef::new))
            .collect::<Result<Vec<_>>>()?;

        self.send_frame(
            MessageType::Load,
            vec![ident.to_owned()],
            Some(State::load(tracks)),
        )
        .await
    }

    /// Returns a snapshot of the devices that notified this controller.
    ///
    /// Devices stay listed after they go offline.
    #[must_use]
    pub fn list_devices(&self) -> Vec<Device> {
        self.devices.list()
    }

    /// Returns a snapshot of the devices found through local discovery.
    #[must_use]
    pub fn list_mdns_devices(&self) -> Vec<Device> {
        self.session
            .discovered_devices()
            .into_iter()
            .map(|device| Device {
                name: device.name,
                ident: String::new(),
                url: Some(device.url),
            })
            .collect()
    }

    /// Asks a locally discovered device to connect to the user's account.
    pub async fn connect_to_device(&self, address: &str) -> Result<()> {
        debug!("connecting to device at {address}");
        self.session.connect_to_device(address).await
    }

    /// Stops listening for devices and waits for the background task to end.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the background task panicked.
    pub async fn stop(mut self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(receiver) = self.receiver.take() {
            receiver.await?;
        }

        Ok(())
    }

    async fn send_frame(
        &self,
        message_type: MessageType,
        recipients: Vec<String>,
        state: Option<State>,
    ) -> Result<()> {
        // Held until the request is sent.
        let mut sequence = self.sequence.lock().await;

        let frame = Frame {
            recipients,
            state,
            ..Frame::new(self.ident.clone(), sequence.advance()?, message_type)
        };

        let request = Request {
            method: Method::Send,
            uri: Topic::remote(self.username.as_str()).to_string(),
            payload: vec![frame.encode()?],
        };

        debug!("-> {frame}");
        trace!("{request}");

        self.session.send_request(request).await
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        trace!("dropping controller {}", self.ident);
        self.shutdown.cancel();
    }
}
