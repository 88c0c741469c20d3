use regex_syntax::hir::literal::{ExtractKind, Extractor};
use regex_syntax::ParserBuilder;

/// Extract the prefix literals of a catalog regex for the Aho-Corasick
/// pre-filter. Every match of the regex starts with one of the returned
/// (lowercased) literals.
///
/// Returns an empty vec when no such guarantee can be given: the pattern uses
/// syntax `regex_syntax` does not know (lookaround, backreferences), the
/// literal set is infinite, or any literal is shorter than `min_len`. Such an
/// entry becomes an "always candidate" that is checked on every input.
pub(crate) fn extract_literals(pattern: &str, flags: &str, min_len: usize) -> Vec<String> {
    let hir = match ParserBuilder::new()
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .parse(pattern)
    {
        Ok(h) => h,
        Err(_) => return Vec::new(),
    };

    let mut extractor = Extractor::new();
    extractor.kind(ExtractKind::Prefix);

    let seq = extractor.extract(&hir);
    let Some(literals) = seq.literals() else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::with_capacity(literals.len());
    for lit in literals {
        let Ok(s) = std::str::from_utf8(lit.as_bytes()) else {
            return Vec::new();
        };
        // The pre-filter is ASCII case-insensitive only.
        if s.len() < min_len || !s.is_ascii() {
            return Vec::new();
        }
        let lower = s.to_ascii_lowercase();
        if !out.contains(&lower) {
            out.push(lower);
        }
    }
    out
}
