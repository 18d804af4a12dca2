//! Multilingual terms: labels, descriptions and aliases.

/// A text in one language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    language: String,
    text: String,
}

impl Term {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An ordered list of texts in one language (aliases).
///
/// Texts are expected to be distinct; callers are responsible for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiTerm {
    language: String,
    texts: Vec<String>,
}

impl MultiTerm {
    pub fn new(language: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            language: language.into(),
            texts,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Anything stored in a language-keyed map.
pub trait LanguageKeyed {
    fn language_key(&self) -> &str;
}

impl LanguageKeyed for Term {
    fn language_key(&self) -> &str {
        &self.language
    }
}

impl LanguageKeyed for MultiTerm {
    fn language_key(&self) -> &str {
        &self.language
    }
}

/// Insertion-ordered map from language code to a term value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMap<T> {
    entries: Vec<T>,
}

impl<T> Default for LanguageMap<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: LanguageKeyed> LanguageMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`, replacing the entry of the same language in place.
    /// Returns the replaced entry.
    pub fn set(&mut self, value: T) -> Option<T> {
        match self
            .entries
            .iter_mut()
            .find(|e| e.language_key() == value.language_key())
        {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push(value);
                None
            }
        }
    }

    pub fn get(&self, language: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.language_key() == language)
    }

    pub fn remove(&mut self, language: &str) -> Option<T> {
        let pos = self.entries.iter().position(|e| e.language_key() == language)?;
        Some(self.entries.remove(pos))
    }

    pub fn has(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: LanguageKeyed> FromIterator<T> for LanguageMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = Self::new();
        for value in iter {
            map.set(value);
        }
        map
    }
}

impl<'a, T> IntoIterator for &'a LanguageMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Labels or descriptions, one per language.
pub type TermMap = LanguageMap<Term>;

/// Aliases, one ordered list per language.
pub type MultiTermMap = LanguageMap<MultiTerm>;

/// The label, description and alias bundle of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    pub labels: TermMap,
    pub descriptions: TermMap,
    pub aliases: MultiTermMap,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self, language: &str) -> Option<&Term> {
        self.labels.get(language)
    }

    pub fn description(&self, language: &str) -> Option<&Term> {
        self.descriptions.get(language)
    }

    pub fn set_label(&mut self, term: Term) {
        self.labels.set(term);
    }

    pub fn set_description(&mut self, term: Term) {
        self.descriptions.set(term);
    }

    pub fn remove_description(&mut self, language: &str) -> Option<Term> {
        self.descriptions.remove(language)
    }

    pub fn set_aliases(&mut self, aliases: MultiTerm) {
        self.aliases.set(aliases);
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.descriptions.is_empty() && self.aliases.is_empty()
    }
}
