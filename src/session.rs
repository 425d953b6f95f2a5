//! The session a controller runs on.
//!
//! A [`Session`] owns the encrypted connection to the service and exposes
//! the Mercury publish/subscribe primitives, plus a read-only view of the
//! devices found through local network discovery. Connecting, logging in
//! and running discovery are the session's business; the controller only
//! uses what this trait offers.

use async_trait::async_trait;
use url::Url;

use crate::{
    error::{Error, Result},
    mercury::{Request, Subscription},
};

/// A device found through local network discovery.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredDevice {
    /// Advertised display name.
    pub name: String,

    /// Endpoint of the device's local control interface.
    pub url: Url,
}

#[async_trait]
pub trait Session: Send + Sync + 'static {
    /// Subscribes to `uri`, returning the stream of messages published on it.
    ///
    /// Subscriptions are independent; a caller may merge several of them.
    async fn subscribe(&self, uri: &str) -> Result<Subscription>;

    /// Sends a one-shot request without waiting for a response.
    async fn send_request(&self, request: Request) -> Result<()>;

    /// Username of the logged in user, if the session knows it.
    fn login_username(&self) -> Option<String> {
        None
    }

    /// Snapshot of the devices currently known to local discovery.
    fn discovered_devices(&self) -> Vec<DiscoveredDevice> {
        Vec::new()
    }

    /// Asks the discovered device at `address` to connect to this session's
    /// account.
    async fn connect_to_device(&self, address: &str) -> Result<()> {
        Err(Error::unimplemented(format!(
            "session cannot connect to device at {address}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Offline;

    #[async_trait]
    impl Session for Offline {
        async fn subscribe(&self, uri: &str) -> Result<Subscription> {
            Err(Error::unavailable(format!("cannot subscribe to {uri}")))
        }

        async fn send_request(&self, request: Request) -> Result<()> {
            Err(Error::unavailable(format!("cannot send {request}")))
        }
    }

    #[tokio::test]
    async fn discovery_is_optional() {
        let session = Offline;
        assert_eq!(session.login_username(), None);
        assert!(session.discovered_devices().is_empty());

        let err = session.connect_to_device("10.0.0.2:4070").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unimplemented);
    }
}
