//! Version constraint parsing and matching for probed dependencies.
//!
//! Native packages do not follow one versioning scheme, so the matcher here is
//! deliberately permissive: versions are compared component-wise after
//! splitting on dots and hyphens, numeric components compare numerically, and
//! anything else falls back to lexical ordering. A shorter version is padded
//! with zero components, so `"1.2"` equals `"1.2.0"`.
//!
//! A requirement is an optional comparison operator (`<`, `<=`, `=`, `==`,
//! `!=`, `>=`, `>`; `=` when omitted) followed by a version. A lookup may carry
//! several requirements; all of them must hold.
//!
//! # Examples
//!
//! ```rust
//! use pkgprobe::version::{matches, matches_all};
//!
//! assert!(matches("2.1.0", ">=2.0"));
//! assert!(matches("1.2", "1.2.0"));
//! assert!(!matches("1.9", ">=2.0"));
//!
//! let outcome = matches_all("2.1.0", &[">=2.0".to_string(), "<3".to_string()]);
//! assert!(outcome.satisfied);
//! assert!(outcome.unmet.is_empty());
//! ```

use std::cmp::Ordering;

/// A version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Strictly older.
    Lt,
    /// Older or equal.
    Le,
    /// Component-wise equal.
    Eq,
    /// Component-wise different.
    Ne,
    /// Newer or equal.
    Ge,
    /// Strictly newer.
    Gt,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
        }
    }
}

/// The outcome of evaluating a conjunction of requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    /// Whether every requirement held.
    pub satisfied: bool,
    /// Requirements that did not hold, in input order.
    pub unmet: Vec<String>,
    /// Requirements that held, in input order.
    pub met: Vec<String>,
}

/// Splits a requirement into its operator and target version.
///
/// Two-character operators are matched before their one-character prefixes, so
/// `">=2.0"` parses as `Ge` rather than `Gt` on `"=2.0"`.
fn split_requirement(requirement: &str) -> (CompareOp, &str) {
    let requirement = requirement.trim();
    const OPERATORS: [(&str, CompareOp); 7] = [
        ("<=", CompareOp::Le),
        (">=", CompareOp::Ge),
        ("!=", CompareOp::Ne),
        ("==", CompareOp::Eq),
        ("<", CompareOp::Lt),
        (">", CompareOp::Gt),
        ("=", CompareOp::Eq),
    ];
    for (prefix, op) in OPERATORS {
        if let Some(rest) = requirement.strip_prefix(prefix) {
            return (op, rest.trim());
        }
    }
    (CompareOp::Eq, requirement)
}

/// Compares two version strings component-wise.
///
/// Components are split on `.` and `-`; a pair of numeric components compares
/// numerically, any other pair lexically. The shorter version is padded with
/// `"0"` components, so trailing zeros do not affect equality.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split(['.', '-']).collect();
    let right: Vec<&str> = b.split(['.', '-']).collect();
    let len = left.len().max(right.len());
    for index in 0..len {
        let x = left.get(index).copied().unwrap_or("0");
        let y = right.get(index).copied().unwrap_or("0");
        let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(nx), Ok(ny)) => nx.cmp(&ny),
            _ => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Whether `version` satisfies a single requirement.
#[must_use]
pub fn matches(version: &str, requirement: &str) -> bool {
    let (op, target) = split_requirement(requirement);
    op.holds(compare(version, target))
}

/// Evaluates a conjunction of requirements against `version`.
///
/// The returned [`VersionMatch`] partitions the requirements into exactly the
/// unmet and met subsets; `satisfied` is true iff the unmet subset is empty.
#[must_use]
pub fn matches_all(version: &str, requirements: &[String]) -> VersionMatch {
    let mut unmet = Vec::new();
    let mut met = Vec::new();
    for requirement in requirements {
        if matches(version, requirement) {
            met.push(requirement.clone());
        } else {
            unmet.push(requirement.clone());
        }
    }
    VersionMatch {
        satisfied: unmet.is_empty(),
        unmet,
        met,
    }
}
