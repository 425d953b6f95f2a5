//! Request and response types of the Mercury pub/sub transport.
//!
//! Mercury carries multi-part payloads addressed by `hm://` URIs. The
//! controller only sends one-shot `SEND` requests and consumes subscription
//! streams; everything else about the transport is up to the
//! [`Session`](crate::session::Session) implementation.

use std::fmt;

use futures_util::stream::BoxStream;

/// Mercury request methods.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    Get,
    Send,
    Subscribe,
    Unsubscribe,
}

impl Method {
    /// Wire value for [`Method::Get`](#variant.Get).
    const GET: &'static str = "GET";

    /// Wire value for [`Method::Send`](#variant.Send).
    const SEND: &'static str = "SEND";

    /// Wire value for [`Method::Subscribe`](#variant.Subscribe).
    const SUB: &'static str = "SUB";

    /// Wire value for [`Method::Unsubscribe`](#variant.Unsubscribe).
    const UNSUB: &'static str = "UNSUB";
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "{}", Self::GET),
            Self::Send => write!(f, "{}", Self::SEND),
            Self::Subscribe => write!(f, "{}", Self::SUB),
            Self::Unsubscribe => write!(f, "{}", Self::UNSUB),
        }
    }
}

/// An outbound Mercury request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub uri: String,

    /// Payload parts, sent in order.
    pub payload: Vec<Vec<u8>>,
}

/// An inbound Mercury message delivered to a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub uri: String,

    /// Payload parts, in the order they were received.
    pub payload: Vec<Vec<u8>>,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} parts)",
            self.method,
            self.uri,
            self.payload.len()
        )
    }
}

/// Stream of messages published on a subscribed topic.
///
/// The stream ends when the session drops the subscription.
pub type Subscription = BoxStream<'static, Response>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_requests() {
        let request = Request {
            method: Method::Send,
            uri: "hm://remote/user/alice/".to_owned(),
            payload: vec![vec![0x08, 0x01]],
        };
        assert_eq!(request.to_string(), "SEND hm://remote/user/alice/ (1 parts)");
        assert_eq!(Method::Unsubscribe.to_string(), "UNSUB");
    }
}
