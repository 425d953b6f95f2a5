use std::fmt;

/// A remote-control `Topic` on the Mercury pub/sub transport.
///
/// Topics are scoped by username. Controllers publish to the unversioned
/// topic and listen on both the unversioned and the versioned one, because
/// devices of different generations notify on either.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Topic {
    /// The user whose devices publish on this topic.
    pub username: String,

    /// The protocol generation of this topic.
    pub version: Version,
}

/// Protocol generations that have their own remote-control topic.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    /// `hm://remote/user/<username>/`
    Unversioned,

    /// `hm://remote/user/<username>/v23`
    V23,
}

impl Topic {
    /// Wire prefix shared by all remote-control topics.
    const PREFIX: &'static str = "hm://remote/user/";

    #[must_use]
    pub fn new(username: impl Into<String>, version: Version) -> Self {
        Self {
            username: username.into(),
            version,
        }
    }

    /// Returns the topic that commands are sent to.
    #[must_use]
    pub fn remote(username: impl Into<String>) -> Self {
        Self::new(username, Version::Unversioned)
    }

    /// Returns all topics a controller listens on.
    #[must_use]
    pub fn subscriptions(username: &str) -> [Self; 2] {
        [
            Self::new(username, Version::V23),
            Self::new(username, Version::Unversioned),
        ]
    }
}

impl Version {
    /// Wire value for [`Version::V23`](#variant.V23).
    const V23_SUFFIX: &'static str = "v23";
}

impl fmt::Display for Topic {
    /// Formats a `Topic` as a Mercury URI.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", Self::PREFIX, self.username, self.version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unversioned => Ok(()),
            Self::V23 => write!(f, "{}", Self::V23_SUFFIX),
        }
    }
}
