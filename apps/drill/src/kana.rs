//! Romaji to hiragana adapter for typed responses.

use study_engine::Transliterator;
use wana_kana::ConvertJapanese;

/// Converts romanized keystrokes to hiragana.
#[derive(Debug, Clone, Copy, Default)]
pub struct KanaTransliterator;

impl Transliterator for KanaTransliterator {
    fn transliterate(&self, romanized: &str) -> String {
        romanized.to_hiragana()
    }
}
