//! The Japanese analyzer.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use lindera_core::mode::Mode;
use lindera_dictionary::{DictionaryConfig, DictionaryKind};
use lindera_tokenizer::tokenizer::{Tokenizer, TokenizerConfig};
use regex::Regex;

use crate::error::AnalysisError;

// ASCII punctuation plus the full-width/Japanese symbols that never carry
// search meaning. Replaced with spaces before tokenization.
static STOP_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"[!"#$%&'\\()*+,\-./:;<=>?@\[\]^_`{|}~「」〔〕“”〈〉『』【】＆＊・（）＄＃＠。、？！｀＋￥％]"##,
    )
    .expect("symbol pattern")
});

/// Morphological analyzer producing space-joined token strings.
///
/// Construction embeds the IPADIC dictionary and reads the stopword list, so
/// it is expensive; build one instance at startup and share it. `analyze`
/// itself is deterministic and side-effect-free.
pub struct JapaneseAnalyzer {
    tokenizer: Tokenizer,
    stopwords: HashSet<String>,
}

impl JapaneseAnalyzer {
    /// Build an analyzer from a stopword list file (one token per line).
    pub fn from_stopwords_file(path: &Path) -> Result<Self, AnalysisError> {
        let stopwords = std::fs::read_to_string(path)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self::with_stopwords(stopwords)
    }

    /// Build an analyzer with an explicit stopword set.
    pub fn with_stopwords(stopwords: HashSet<String>) -> Result<Self, AnalysisError> {
        let config = TokenizerConfig {
            dictionary: DictionaryConfig {
                kind: Some(DictionaryKind::IPADIC),
                path: None,
            },
            user_dictionary: None,
            mode: Mode::Normal,
        };
        let tokenizer = Tokenizer::from_config(config)?;

        Ok(Self {
            tokenizer,
            stopwords,
        })
    }

    /// Tokenize text into a space-joined token string.
    ///
    /// Symbols are stripped first, then each surface form that is not a
    /// stopword is kept in order.
    pub fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        let cleaned = STOP_SYMBOLS.replace_all(text, " ");

        let tokens = self.tokenizer.tokenize(&cleaned)?;

        let mut surfaces = Vec::with_capacity(tokens.len());
        for token in tokens {
            let surface: &str = token.text.as_ref();
            if surface.trim().is_empty() {
                continue;
            }
            if self.stopwords.contains(surface) {
                continue;
            }
            surfaces.push(surface.to_string());
        }

        Ok(surfaces.join(" "))
    }
}
