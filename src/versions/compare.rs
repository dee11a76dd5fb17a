//! versions::compare
//!
//! Debian package version ordering.
//!
//! A version is `[epoch:]upstream[-revision]`. Epochs compare numerically.
//! Upstream and revision compare by alternating non-digit and digit runs:
//! non-digit runs character by character (`~` before everything, even the
//! end of the string, and letters before other characters), digit runs
//! numerically.

use std::cmp::Ordering;

/// A parsed version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianVersion<'a> {
    pub epoch: u64,
    pub upstream: &'a str,
    pub revision: &'a str,
}

impl<'a> DebianVersion<'a> {
    /// Split a version string into its parts.
    ///
    /// A missing or non-numeric epoch is treated as zero.
    pub fn parse(version: &'a str) -> Self {
        let version = version.trim();
        let (epoch, rest) = match version.split_once(':') {
            Some((epoch, rest)) => (epoch.parse().unwrap_or(0), rest),
            None => (0, version),
        };
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => (upstream, revision),
            None => (rest, ""),
        };
        Self {
            epoch,
            upstream,
            revision,
        }
    }
}

impl Ord for DebianVersion<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_part(self.upstream, other.upstream))
            .then_with(|| compare_part(self.revision, other.revision))
    }
}

impl PartialOrd for DebianVersion<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two version strings.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use bugsmith::versions::compare_versions;
///
/// assert_eq!(compare_versions("1.0~rc1", "1.0"), Ordering::Less);
/// assert_eq!(compare_versions("1:0.9", "2.0"), Ordering::Greater);
/// assert_eq!(compare_versions("1.0-1", "1.0-1"), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    DebianVersion::parse(a).cmp(&DebianVersion::parse(b))
}

/// Sort weight of one character in a non-digit run. `None` is end of run.
fn weight(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

fn compare_part(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.as_bytes(), b.as_bytes());

    while !a.is_empty() || !b.is_empty() {
        // Non-digit run
        loop {
            let ca = a.first().copied().filter(|c| !c.is_ascii_digit());
            let cb = b.first().copied().filter(|c| !c.is_ascii_digit());
            if ca.is_none() && cb.is_none() {
                break;
            }
            match weight(ca).cmp(&weight(cb)) {
                Ordering::Equal => {}
                other => return other,
            }
            if ca.is_some() {
                a = &a[1..];
            }
            if cb.is_some() {
                b = &b[1..];
            }
        }

        // Digit run
        let (da, rest_a) = split_digits(a);
        let (db, rest_b) = split_digits(b);
        match compare_digits(da, db) {
            Ordering::Equal => {}
            other => return other,
        }
        a = rest_a;
        b = rest_b;
    }

    Ordering::Equal
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compare digit runs numerically without overflow.
fn compare_digits(a: &[u8], b: &[u8]) -> Ordering {
    fn significant(s: &[u8]) -> &[u8] {
        let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
        &s[start..]
    }
    let (a, b) = (significant(a), significant(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_parts() {
        assert_eq!(
            DebianVersion::parse("2:1.2-3-4"),
            DebianVersion {
                epoch: 2,
                upstream: "1.2-3",
                revision: "4"
            }
        );
        assert_eq!(DebianVersion::parse("7.3").revision, "");
    }

    #[test]
    fn ordering_cases() {
        let less = [
            ("1.0", "1.1"),
            ("1.0~rc1", "1.0"),
            ("1.0~~", "1.0~"),
            ("1.0", "1.0a"),
            ("1.0a", "1.0+"),
            ("1.0-1", "1.0-2"),
            ("1.9", "1.10"),
            ("9.9", "1:0.1"),
            ("2.30-1", "2.30-1+deb12u1"),
            ("0.9", "0.09.1"),
        ];
        for (a, b) in less {
            assert_eq!(compare_versions(a, b), Ordering::Less, "{a} < {b}");
            assert_eq!(compare_versions(b, a), Ordering::Greater, "{b} > {a}");
        }
    }

    #[test]
    fn equal_cases() {
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("0:1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.01", "1.1"), Ordering::Equal);
        assert_eq!(compare_versions("1.0-0", "1.0"), Ordering::Equal);
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            compare_versions("1.99999999999999999999999", "1.100000000000000000000000"),
            Ordering::Less
        );
    }

    proptest! {
        #[test]
        fn comparison_is_antisymmetric(a in "[0-9a-z.+~-]{0,12}", b in "[0-9a-z.+~-]{0,12}") {
            prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
        }

        #[test]
        fn comparison_is_reflexive(a in "[0-9]{0,2}:?[0-9a-z.+~]{0,10}(-[0-9a-z.+~]{1,4})?") {
            prop_assert_eq!(compare_versions(&a, &a), Ordering::Equal);
        }
    }
}
