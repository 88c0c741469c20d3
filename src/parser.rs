use aho_corasick::AhoCorasick;
use rayon::prelude::*;

use crate::db::PatternFields;
use crate::error::{Error, Result};
use crate::literal::extract_literals;

/// Literals shorter than this are too unselective to be worth pre-filtering on.
const MIN_LITERAL_LEN: usize = 3;

/// Inline modifiers a catalog pattern may carry.
const SUPPORTED_FLAGS: &[char] = &['i', 'm', 's', 'x'];

/// Build the full regex string: catalog flags become an inline group.
pub(crate) fn full_pattern(regex: &str, flags: &str) -> String {
    if flags.is_empty() {
        regex.to_string()
    } else {
        format!("(?{}){}", flags, regex)
    }
}

/// A compiled catalog pattern.
///
/// Keeps the source fields so the dataset can be verified and re-serialized.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: fancy_regex::Regex,
    fields: PatternFields,
    hash: String,
}

impl Pattern {
    pub fn compile(fields: PatternFields, hash: String) -> Result<Self> {
        if let Some(flag) = fields.flags.chars().find(|c| !SUPPORTED_FLAGS.contains(c)) {
            return Err(Error::InvalidFlags {
                id: fields.id,
                flag,
            });
        }
        let regex = fancy_regex::Regex::new(&full_pattern(&fields.regex, &fields.flags))?;
        Ok(Self {
            regex,
            fields,
            hash,
        })
    }

    pub fn id(&self) -> u32 {
        self.fields.id
    }

    pub fn position(&self) -> u32 {
        self.fields.position
    }

    pub fn regex(&self) -> &str {
        &self.fields.regex
    }

    pub fn flags(&self) -> &str {
        &self.fields.flags
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn fields(&self) -> &PatternFields {
        &self.fields
    }

    /// Capture group holding the version: explicit, else group 1 if the regex has one.
    pub fn version_group(&self) -> Option<usize> {
        match self.fields.version_group {
            Some(g) => Some(g),
            None if self.regex.captures_len() > 1 => Some(1),
            None => None,
        }
    }

    /// Substring search. A regex runtime error (backtrack limit) counts as no match.
    pub(crate) fn find<'t>(&self, ua: &'t str) -> Option<fancy_regex::Captures<'t>> {
        self.regex.captures(ua).ok().flatten()
    }
}

/// Result of a successful match.
pub(crate) struct MatchResult<'a, 't, T> {
    pub pattern: &'a Pattern,
    pub data: &'a T,
    pub captures: fancy_regex::Captures<'t>,
}

impl<'a, 't, T> MatchResult<'a, 't, T> {
    /// The non-empty text of the pattern's version group, if any.
    pub fn version(&self) -> Option<&'t str> {
        let group = self.pattern.version_group()?;
        self.captures
            .get(group)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// PatternList — ordered first-match-wins list
// ---------------------------------------------------------------------------

/// Core matching engine: an ordered list of patterns where the earliest entry
/// that *finds* a match wins.
///
/// An Aho-Corasick pre-filter over the patterns' prefix literals narrows the
/// candidates; entries without usable literals are always tried. Candidates
/// are still tried in list order, so the pre-filter never changes the result.
pub struct PatternList<T> {
    entries: Vec<(Pattern, T)>,
    prefilter: Option<AhoCorasick>,
    /// Maps Aho-Corasick pattern index → entry index.
    literal_to_entry: Vec<usize>,
    /// Entries that must be checked on every input, ascending.
    always: Vec<usize>,
}

impl<T> Default for PatternList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            prefilter: None,
            literal_to_entry: Vec::new(),
            always: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for PatternList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternList")
            .field("len", &self.entries.len())
            .field("literals", &self.literal_to_entry.len())
            .field("always", &self.always.len())
            .finish()
    }
}

impl<T> PatternList<T> {
    /// Build from `(pattern fields, hash, data)` triples, keeping their order.
    /// Regexes compile in parallel.
    pub fn build(items: Vec<(PatternFields, String, T)>) -> Result<Self>
    where
        T: Send,
    {
        let compiled: Vec<(Pattern, T)> = items
            .into_par_iter()
            .map(|(fields, hash, data)| Pattern::compile(fields, hash).map(|p| (p, data)))
            .collect::<Result<Vec<_>>>()?;

        let mut literals: Vec<String> = Vec::new();
        let mut literal_to_entry: Vec<usize> = Vec::new();
        let mut always: Vec<usize> = Vec::new();

        for (idx, (pattern, _)) in compiled.iter().enumerate() {
            let lits = extract_literals(pattern.regex(), pattern.flags(), MIN_LITERAL_LEN);
            if lits.is_empty() {
                always.push(idx);
                continue;
            }
            for lit in lits {
                literals.push(lit);
                literal_to_entry.push(idx);
            }
        }

        let prefilter = if literals.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(&literals)?,
            )
        };

        Ok(Self {
            entries: compiled,
            prefilter,
            literal_to_entry,
            always,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &T)> {
        self.entries.iter().map(|(p, d)| (p, d))
    }

    /// Entry indices worth trying for `ua`, ascending and deduplicated.
    fn candidates(&self, ua: &str) -> Vec<usize> {
        let mut out = self.always.clone();
        if let Some(ac) = &self.prefilter {
            for m in ac.find_overlapping_iter(ua) {
                out.push(self.literal_to_entry[m.pattern().as_usize()]);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Find the first matching entry (preserving list order).
    pub(crate) fn match_first<'a, 't>(&'a self, ua: &'t str) -> Option<MatchResult<'a, 't, T>> {
        self.candidates(ua).into_iter().find_map(|idx| {
            let (pattern, data) = &self.entries[idx];
            pattern.find(ua).map(|captures| MatchResult {
                pattern,
                data,
                captures,
            })
        })
    }
}
