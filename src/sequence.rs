use crate::error::{Error, Result};

/// Sequence numbers stamped onto outbound frames.
///
/// The counter starts at zero and is advanced before each send, so the
/// first frame carries sequence number 1. Numbers are never reused: once
/// the range is exhausted, [`advance`](Self::advance) keeps failing.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sequence {
    current: u32,
}

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the counter and returns the new sequence number.
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` when all sequence numbers have been used.
    pub fn advance(&mut self) -> Result<u32> {
        self.current = self
            .current
            .checked_add(1)
            .ok_or_else(|| Error::resource_exhausted("sequence numbers exhausted"))?;
        Ok(self.current)
    }

    /// Returns the last sequence number handed out, or 0 if none was.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }
}
