//! Devices observed on the remote-control topics.
//!
//! The [`Registry`] is the controller's view of which devices exist. It is
//! written only by the receive loop, which records every device that sends
//! a notification, and read by anyone through snapshots. Devices are never
//! removed: a device that went offline stays listed under the name it last
//! announced.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use url::Url;

/// A playback device.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Device {
    /// Display name.
    pub name: String,

    /// Unique identity of the device. Empty for devices that were only
    /// found through local discovery.
    pub ident: String,

    /// Local control endpoint, only known for devices found through local
    /// discovery.
    pub url: Option<Url>,
}

/// Thread-safe map of device identity to the last known [`Device`].
#[derive(Debug, Default)]
pub struct Registry {
    devices: RwLock<HashMap<String, Device>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the device `ident` under `name`, replacing any previous entry
    /// for the same identity.
    pub(crate) fn upsert(&self, ident: &str, name: &str) {
        let device = Device {
            name: name.to_owned(),
            ident: ident.to_owned(),
            url: None,
        };

        // Entries are replaced whole, so a poisoned map is still consistent.
        let previous = self
            .devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ident.to_owned(), device);

        match previous {
            Some(previous) if previous.name != name => {
                debug!("device {ident} renamed from {} to {name}", previous.name);
            }
            Some(_) => {}
            None => info!("found device {name} ({ident})"),
        }
    }

    /// Returns a snapshot of all known devices, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
