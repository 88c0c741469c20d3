use std::fmt;

/// A dotted version number such as `102.0.1` plus an optional trailing
/// extension (`b3`, ` beta`, `-rc1`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionNumber {
    groups: Vec<String>,
    extension: String,
}

fn is_extension_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || matches!(c, '-' | '.' | '[' | ']')
}

/// Length of the `\d+(\.\d+)*` run at the start of `s`, if any.
fn number_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let first = digits(0);
    if first == 0 {
        return None;
    }
    let mut end = first;
    while bytes.get(end) == Some(&b'.') {
        match digits(end + 1) {
            0 => break,
            n => end += 1 + n,
        }
    }
    Some(end)
}

/// Parse the number at the start of `s`; returns it with the consumed length.
fn parse_at(s: &str) -> Option<(VersionNumber, usize)> {
    let num_end = number_len(s)?;
    let ext_len: usize = s[num_end..]
        .chars()
        .take_while(|c| is_extension_char(*c))
        .map(char::len_utf8)
        .sum();
    let groups = s[..num_end].split('.').map(str::to_string).collect();
    let extension = s[num_end..num_end + ext_len].trim_end().to_string();
    Some((VersionNumber { groups, extension }, num_end + ext_len))
}

impl VersionNumber {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Parse a captured version such as `102.0b3`. Input that does not start
    /// with a digit keeps the whole text as extension.
    pub fn parse(version: &str) -> Self {
        match parse_at(version) {
            Some((v, _)) => v,
            None => Self {
                groups: Vec::new(),
                extension: version.trim_end().to_string(),
            },
        }
    }

    /// The last version number occurring anywhere in `text`, e.g. `2.1` in
    /// `Googlebot/2.1`.
    pub fn parse_last(text: &str) -> Self {
        let mut last = None;
        let mut i = 0;
        while i < text.len() {
            let rest = &text[i..];
            match parse_at(rest) {
                Some((v, consumed)) => {
                    last = Some(v);
                    i += consumed;
                }
                None => i += rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        last.unwrap_or_default()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn major(&self) -> &str {
        self.groups.first().map_or("", String::as_str)
    }

    pub fn minor(&self) -> &str {
        self.groups.get(1).map_or("", String::as_str)
    }

    pub fn bugfix(&self) -> &str {
        self.groups.get(2).map_or("", String::as_str)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_unknown(&self) -> bool {
        self.groups.is_empty() && self.extension.is_empty()
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.groups.join("."), self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_groups() {
        let v = VersionNumber::parse("102.0.1");
        assert_eq!(v.groups(), ["102", "0", "1"]);
        assert_eq!(v.major(), "102");
        assert_eq!(v.bugfix(), "1");
        assert_eq!(v.extension(), "");
    }

    #[test]
    fn extension_is_kept() {
        let v = VersionNumber::parse("3.6b4");
        assert_eq!(v.groups(), ["3", "6"]);
        assert_eq!(v.extension(), "b4");
        assert_eq!(v.to_string(), "3.6b4");
    }

    #[test]
    fn trailing_dot_is_extension() {
        let v = VersionNumber::parse("9.");
        assert_eq!(v.groups(), ["9"]);
        assert_eq!(v.extension(), ".");
    }

    #[test]
    fn non_numeric_is_extension_only() {
        let v = VersionNumber::parse("beta");
        assert!(v.groups().is_empty());
        assert_eq!(v.extension(), "beta");
        assert!(VersionNumber::parse("").is_unknown());
    }

    #[test]
    fn last_number_in_text() {
        assert_eq!(VersionNumber::parse_last("Googlebot/2.1").to_string(), "2.1");
        assert_eq!(
            VersionNumber::parse_last("Yahoo! Slurp 3.0 (compatible; v2)").major(),
            "2"
        );
        assert!(VersionNumber::parse_last("Slurp").is_unknown());
    }
}
