//! Pragma version constraints.
//!
//! Solidity pragmas carry a conjunction of simple comparators
//! (`^0.8.0`, `>=0.4.22 <0.9.0`, `0.8.17`). Rules only need coarse
//! questions answered: what is the lowest compiler the constraint admits,
//! and is it an exact pin. Disjunctions (`||`) are rare enough that the
//! parser gives up on them and rules stay quiet.

use regex::Regex;
use std::sync::LazyLock;

static COMPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\^|~|>=|<=|>|<|=)?\s*(\d+)\.(\d+)(?:\.(\d+))?$").unwrap()
});

/// One comparator of a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: (u32, u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Exact,
    Caret,
    Tilde,
    Ge,
    Gt,
    Le,
    Lt,
}

/// A parsed pragma constraint: the conjunction of its comparators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    comparators: Vec<Comparator>,
}

impl VersionReq {
    /// Parse a constraint from pragma text. Accepts a whole directive
    /// (`pragma solidity ^0.8.0;`) or just the constraint part.
    pub fn parse(text: &str) -> Option<Self> {
        let mut constraint = text.trim();
        if let Some(rest) = constraint.strip_prefix("pragma") {
            constraint = rest.trim_start().strip_prefix("solidity")?.trim();
        }
        let constraint = constraint.trim_end_matches(';').trim();
        if constraint.is_empty() || constraint.contains("||") {
            return None;
        }

        let mut comparators = Vec::new();
        for token in constraint.split_whitespace() {
            let caps = COMPARATOR.captures(token)?;
            let op = match caps.get(1).map(|m| m.as_str()) {
                None | Some("=") => Op::Exact,
                Some("^") => Op::Caret,
                Some("~") => Op::Tilde,
                Some(">=") => Op::Ge,
                Some(">") => Op::Gt,
                Some("<=") => Op::Le,
                Some("<") => Op::Lt,
                Some(_) => return None,
            };
            let major = caps[2].parse().ok()?;
            let minor = caps[3].parse().ok()?;
            let patch = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
            comparators.push(Comparator {
                op,
                version: (major, minor, patch),
            });
        }
        (!comparators.is_empty()).then_some(Self { comparators })
    }

    /// True for a single `=x.y.z`-style comparator: the pragma pins one
    /// exact compiler release.
    pub fn is_exact_pin(&self) -> bool {
        matches!(self.comparators.as_slice(), [c] if c.op == Op::Exact)
    }

    /// Lowest version the constraint admits. Upper-bound-only comparators
    /// contribute nothing (the floor stays at 0.0.0).
    pub fn lower_bound(&self) -> (u32, u32, u32) {
        self.comparators
            .iter()
            .map(|c| match c.op {
                Op::Exact | Op::Caret | Op::Tilde | Op::Ge => c.version,
                Op::Gt => {
                    let (maj, min, pat) = c.version;
                    (maj, min, pat + 1)
                }
                Op::Le | Op::Lt => (0, 0, 0),
            })
            .max()
            .unwrap_or((0, 0, 0))
    }

    /// Whether the constraint admits any compiler older than `major.minor`.
    pub fn allows_below(&self, major: u32, minor: u32) -> bool {
        self.lower_bound() < (major, minor, 0)
    }

    /// Whether every admitted compiler is at least `major.minor.patch`.
    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        self.lower_bound() >= (major, minor, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_pragma_directives() {
        let req = VersionReq::parse("pragma solidity ^0.8.0;").unwrap();
        assert!(!req.is_exact_pin());
        assert_eq!(req.lower_bound(), (0, 8, 0));
    }

    #[test]
    fn exact_pins() {
        assert!(VersionReq::parse("0.8.17").unwrap().is_exact_pin());
        assert!(VersionReq::parse("=0.8.17").unwrap().is_exact_pin());
        assert!(!VersionReq::parse("^0.8.17").unwrap().is_exact_pin());
        assert!(!VersionReq::parse(">=0.8.0 <0.9.0").unwrap().is_exact_pin());
    }

    #[test]
    fn lower_bounds() {
        assert_eq!(VersionReq::parse("^0.7.0").unwrap().lower_bound(), (0, 7, 0));
        assert_eq!(
            VersionReq::parse(">=0.4.22 <0.9.0").unwrap().lower_bound(),
            (0, 4, 22)
        );
        assert_eq!(VersionReq::parse(">0.8.3").unwrap().lower_bound(), (0, 8, 4));
    }

    #[test]
    fn overflow_era_detection() {
        assert!(VersionReq::parse("^0.7.0").unwrap().allows_below(0, 8));
        assert!(VersionReq::parse(">=0.6.0").unwrap().allows_below(0, 8));
        assert!(!VersionReq::parse("^0.8.0").unwrap().allows_below(0, 8));
        assert!(!VersionReq::parse("0.8.0").unwrap().allows_below(0, 8));
    }

    #[test]
    fn custom_error_era_detection() {
        assert!(VersionReq::parse("^0.8.4").unwrap().at_least(0, 8, 4));
        assert!(VersionReq::parse("0.8.17").unwrap().at_least(0, 8, 4));
        assert!(!VersionReq::parse("^0.8.0").unwrap().at_least(0, 8, 4));
    }

    #[test]
    fn unparseable_constraints_are_none() {
        assert!(VersionReq::parse("pragma solidity 0.8.0 || 0.7.0;").is_none());
        assert!(VersionReq::parse("pragma abicoder v2;").is_none());
        assert!(VersionReq::parse("").is_none());
    }

    #[test]
    fn two_digit_versions() {
        let req = VersionReq::parse("^0.8").unwrap();
        assert_eq!(req.lower_bound(), (0, 8, 0));
    }
}
