use std::cmp::Ordering;

/// Natural-order comparison: runs of ASCII digits compare numerically, every
/// other character compares by code point. `2024.10` sorts after `2024.9`.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let (da, ra) = split_digits(a);
                let (db, rb) = split_digits(b);
                match cmp_digit_runs(da, db) {
                    Ordering::Equal => {
                        a = ra;
                        b = rb;
                    }
                    ord => return ord,
                }
            }
            (Some(ca), Some(cb)) => match ca.cmp(&cb) {
                Ordering::Equal => {
                    a = &a[ca.len_utf8()..];
                    b = &b[cb.len_utf8()..];
                }
                ord => return ord,
            },
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(end)
}

/// Compare two digit runs by value without parsing, so any length works.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(natural_cmp("2024.10", "2024.9"), Ordering::Greater);
        assert_eq!(natural_cmp("20231201-1", "20231201-02"), Ordering::Less);
        assert_eq!(natural_cmp("1.01", "1.1"), Ordering::Equal);
    }

    #[test]
    fn text_and_prefixes() {
        assert_eq!(natural_cmp("2024.01", "2024.01"), Ordering::Equal);
        assert_eq!(natural_cmp("2024.01", "2024.01a"), Ordering::Less);
        assert_eq!(natural_cmp("v2", "v10"), Ordering::Less);
        assert_eq!(natural_cmp("beta", "alpha"), Ordering::Greater);
    }

    #[test]
    fn huge_runs_do_not_overflow() {
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }
}
