//! Generation tokens for scheduled callbacks.
//!
//! Every tick and flash callback carries the token that was current when it
//! was scheduled. Any teardown advances the source, so a callback that was
//! already in flight finds its token stale and is dropped, whatever the
//! scheduling primitive's own cancellation did.

/// Generation stamped on a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlertToken(u64);

impl AlertToken {
    /// Raw generation number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Monotonic issuer of [`AlertToken`]s.
#[derive(Debug, Default)]
pub struct TokenSource {
    current: u64,
}

impl TokenSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every outstanding token and returns a fresh one.
    pub fn advance(&mut self) -> AlertToken {
        self.current += 1;
        AlertToken(self.current)
    }

    /// The token callbacks must carry to be honored.
    #[must_use]
    pub fn current(&self) -> AlertToken {
        AlertToken(self.current)
    }

    /// Returns true if `token` has not been invalidated.
    #[must_use]
    pub fn is_current(&self, token: AlertToken) -> bool {
        token.0 == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut source = TokenSource::new();
        let first = source.advance();
        let second = source.advance();

        assert!(second > first);
        assert_eq!(second.generation(), 2);
    }

    #[test]
    fn test_advance_invalidates_previous() {
        let mut source = TokenSource::new();
        let old = source.advance();
        assert!(source.is_current(old));

        let new = source.advance();
        assert!(!source.is_current(old));
        assert!(source.is_current(new));
        assert_eq!(source.current(), new);
    }
}
