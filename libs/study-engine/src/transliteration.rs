//! Seam for the external romanized-to-phonetic adapter.

/// Converts romanized keystrokes into phonetic script.
///
/// Called with the whole romanized buffer after every keystroke. Incomplete
/// syllables must pass through unchanged so composition can continue.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, romanized: &str) -> String;
}

impl<F> Transliterator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transliterate(&self, romanized: &str) -> String {
        self(romanized)
    }
}
