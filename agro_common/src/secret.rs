use std::fmt;

const REDACTED: &str = "<redacted>";

/// Holds a value that must never reach the logs, such as the bot token or the webhook secret. Both `Debug` and
/// `Display` print a placeholder; call [`Secret::reveal`] to get at the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret<T = String>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// True for an empty or whitespace-only value.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Compares `candidate` with the secret in time that depends only on the lengths, never on where the first
    /// differing byte sits.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        let len = expected.len().max(candidate.len());
        let mut diff = (expected.len() ^ candidate.len()) as u64;
        for i in 0..len {
            let a = expected.get(i).copied().unwrap_or(0);
            let b = candidate.get(i).copied().unwrap_or(0);
            diff |= u64::from(a ^ b);
        }
        std::hint::black_box(diff) == 0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
