//! Model-name and collection-name conventions.
//!
//! Models are named in `CamelCase` and their collections in plural
//! `snake_case`: `OrderItem` lives in `order_items`. The helpers here derive
//! one from the other and decide whether a requested collection name refers
//! to a registered name.

use std::fmt;

/// Converts `CamelCase` to `snake_case`.
///
/// Acronyms stay together: `HTTPRequest` becomes `http_request`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (index, ch) in chars.iter().copied().enumerate() {
        if ch.is_uppercase() {
            let prev = index.checked_sub(1).map(|i| chars[i]);
            let next = chars.get(index + 1).copied();

            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };

            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    matches!(chars.next(), Some('y'))
        && chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() && !"aeiou".contains(ch))
}

/// English plural of a word, using suffix rules only.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    if ends_with_consonant_y(word) {
        return format!("{}ies", &word[..word.len() - 1]);
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }

    format!("{word}s")
}

/// Candidate singular forms of a word, most likely first.
///
/// Suffix rules are ambiguous in reverse (`boxes` and `houses` end the same
/// way), so every plausible stem is returned.
pub fn singular_forms(word: &str) -> Vec<String> {
    let mut forms = Vec::new();

    if word.len() > 3 {
        if let Some(stem) = word.strip_suffix("ies") {
            forms.push(format!("{stem}y"));
        }
    }

    if let Some(stem) = word.strip_suffix("es") {
        if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| stem.ends_with(suffix)) {
            forms.push(stem.to_string());
        }
    }

    if !word.ends_with("ss") {
        if let Some(stem) = word.strip_suffix('s') {
            if !stem.is_empty() {
                forms.push(stem.to_string());
            }
        }
    }

    forms
}

/// The most likely singular of a word. Words that do not look plural are
/// returned unchanged.
pub fn singularize(word: &str) -> String {
    singular_forms(word)
        .into_iter()
        .next()
        .unwrap_or_else(|| word.to_string())
}

/// The collection a model is stored in by convention.
pub fn collection_name_for(model_name: &str) -> String {
    pluralize(&to_snake_case(model_name))
}

/// How a requested collection name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// An explicit collection-to-declaration override.
    Override,
    Exact,
    CaseInsensitive,
    /// Matched after singular/plural normalisation.
    Inflection,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchKind::Override => "override",
            MatchKind::Exact => "exact",
            MatchKind::CaseInsensitive => "case_insensitive",
            MatchKind::Inflection => "inflection",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NameEntry {
    key: String,
    name: String,
    inflect: bool,
}

/// Lookup from requested collection names to registered entries.
///
/// Each entry has a key (the collection name it is registered under) and the
/// model or schema name it came from. Lookup runs in tiers and the first tier
/// with a hit wins; within a tier, registration order decides:
///
/// 1. exact key match
/// 2. case-insensitive key match
/// 3. singular/plural match against the key, the model name and its
///    `snake_case` form, for entries registered with inflection enabled
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NameIndex {
    entries: Vec<NameEntry>,
}

impl NameIndex {
    pub(crate) fn push(&mut self, key: impl Into<String>, name: impl Into<String>, inflect: bool) {
        self.entries.push(NameEntry { key: key.into(), name: name.into(), inflect });
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Returns the position of the matching entry and how it matched.
    pub(crate) fn find(&self, requested: &str) -> Option<(usize, MatchKind)> {
        if let Some(position) = self.entries.iter().position(|entry| entry.key == requested) {
            return Some((position, MatchKind::Exact));
        }

        let lowered = requested.to_lowercase();
        if let Some(position) = self.entries.iter().position(|entry| entry.key.to_lowercase() == lowered) {
            return Some((position, MatchKind::CaseInsensitive));
        }

        let singulars = singular_forms(&lowered);
        let plural = pluralize(&lowered);

        self.entries
            .iter()
            .position(|entry| entry.inflect && inflection_matches(entry, &lowered, &singulars, &plural))
            .map(|position| (position, MatchKind::Inflection))
    }
}

fn inflection_matches(entry: &NameEntry, lowered: &str, singulars: &[String], plural: &str) -> bool {
    let key = entry.key.to_lowercase();
    let snake = to_snake_case(&entry.name);
    let plain = entry.name.to_lowercase();

    let is_singular_name = |candidate: &str| candidate == snake || candidate == plain;

    is_singular_name(lowered)
        || singulars.iter().any(|form| is_singular_name(form) || *form == key)
        || plural == key
}
