/// Guard/effect expression language — parsing into tagged descriptors.
///
/// Expressions are short free-form strings authored by a generative
/// collaborator, so the grammar is deliberately forgiving. Parsing is
/// asymmetric: a guard that matches no rule is an error (callers fail it
/// closed, hiding the choice), while a stat/goal effect that matches no
/// rule parses to `NoOp` (callers fail it open, leaving state untouched).
/// An unmet guard only hides a choice; a crashing effect could corrupt a
/// playthrough.
///
/// Guard forms:
/// - empty / whitespace        → always true
/// - `name` / `!name`          → tag present / absent (legacy, no namespace)
/// - `tag:name` / `tag:!name`  → same, explicit
/// - `stat:key >= 3`           → numeric comparison (also `goal:`)
/// - `fact:key == token`       → fact equality (`!=` for inequality)
/// - `fact:key`                → truthy: value is "verified" or "true"
///
/// Effect forms:
/// - `name` / `!name`          → add / remove tag (also `tag:` prefixed)
/// - `stat:key+2` / `stat:key-1` → numeric delta (also `goal:`)
/// - `stat:key=5`              → numeric assignment
/// - `fact:key=token`          → set fact
/// - `fact:key`                → set fact to "verified"

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExprError {
    #[error("malformed guard '{raw}': {reason}")]
    MalformedGuard { raw: String, reason: String },
    #[error("malformed effect '{raw}': {reason}")]
    MalformedEffect { raw: String, reason: String },
}

/// The two numeric namespaces. Same semantics, distinct storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Numeric {
    Stat,
    Goal,
}

impl Numeric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Goal => "goal",
        }
    }
}

/// Comparison operator for numeric guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Evaluate `left <op> right`.
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Ge => left >= right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Lt => left < right,
        }
    }
}

/// A parsed guard predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardExpr {
    /// Vacuous guard (empty string).
    Always,
    TagPresent(String),
    TagAbsent(String),
    NumCompare {
        ns: Numeric,
        key: String,
        op: CompareOp,
        value: f64,
    },
    /// `fact:key == token` (or `!=` when negated).
    FactCompare {
        key: String,
        negated: bool,
        value: String,
    },
    /// `fact:key` — true iff the stored value is "verified" or "true".
    FactTruthy(String),
}

/// A parsed effect mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectExpr {
    /// Produces an unchanged snapshot. Non-conforming stat/goal rests
    /// parse to this rather than erroring.
    NoOp,
    TagAdd(String),
    TagRemove(String),
    NumDelta {
        ns: Numeric,
        key: String,
        amount: f64,
    },
    NumAssign {
        ns: Numeric,
        key: String,
        value: f64,
    },
    FactAssign { key: String, value: String },
    /// `fact:key` — sets the fact to "verified".
    FactVerify(String),
}

/// Parse a raw guard string.
pub fn parse_guard(raw: &str) -> Result<GuardExpr, ExprError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(GuardExpr::Always);
    }

    let malformed = |reason: &str| ExprError::MalformedGuard {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let Some((ns, rest)) = split_namespace(trimmed) else {
        // Legacy form: bare tag, optionally negated.
        return parse_tag_name(trimmed)
            .map(|(name, negated)| {
                if negated {
                    GuardExpr::TagAbsent(name)
                } else {
                    GuardExpr::TagPresent(name)
                }
            })
            .ok_or_else(|| malformed("empty tag name"));
    };

    match ns {
        "tag" => parse_tag_name(rest)
            .map(|(name, negated)| {
                if negated {
                    GuardExpr::TagAbsent(name)
                } else {
                    GuardExpr::TagPresent(name)
                }
            })
            .ok_or_else(|| malformed("empty tag name")),
        "stat" | "goal" => {
            let numeric = if ns == "stat" { Numeric::Stat } else { Numeric::Goal };
            let (key, op, value) = parse_comparison(rest)
                .ok_or_else(|| malformed("expected '<key> <op> <number>'"))?;
            Ok(GuardExpr::NumCompare {
                ns: numeric,
                key,
                op,
                value,
            })
        }
        "fact" => {
            if let Some((key, token, negated)) = parse_fact_comparison(rest) {
                if !is_valid_key(&key) {
                    return Err(malformed("invalid fact key"));
                }
                if token.is_empty() {
                    return Err(malformed("empty fact value"));
                }
                return Ok(GuardExpr::FactCompare {
                    key,
                    negated,
                    value: token,
                });
            }
            let key = rest.trim();
            if is_valid_key(key) {
                Ok(GuardExpr::FactTruthy(key.to_string()))
            } else {
                Err(malformed("invalid fact key"))
            }
        }
        other => Err(malformed(&format!("unknown namespace '{other}'"))),
    }
}

/// Parse a raw effect string.
pub fn parse_effect(raw: &str) -> Result<EffectExpr, ExprError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(EffectExpr::NoOp);
    }

    let malformed = |reason: &str| ExprError::MalformedEffect {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let Some((ns, rest)) = split_namespace(trimmed) else {
        return parse_tag_name(trimmed)
            .map(|(name, negated)| {
                if negated {
                    EffectExpr::TagRemove(name)
                } else {
                    EffectExpr::TagAdd(name)
                }
            })
            .ok_or_else(|| malformed("empty tag name"));
    };

    match ns {
        "tag" => parse_tag_name(rest)
            .map(|(name, negated)| {
                if negated {
                    EffectExpr::TagRemove(name)
                } else {
                    EffectExpr::TagAdd(name)
                }
            })
            .ok_or_else(|| malformed("empty tag name")),
        "stat" | "goal" => {
            let numeric = if ns == "stat" { Numeric::Stat } else { Numeric::Goal };
            // Assignment first, then delta; anything else is a no-op so a
            // noisy generated effect can never crash a traversal.
            if let Some((key, value)) = parse_assignment(rest) {
                return Ok(EffectExpr::NumAssign {
                    ns: numeric,
                    key,
                    value,
                });
            }
            if let Some((key, amount)) = parse_delta(rest) {
                return Ok(EffectExpr::NumDelta {
                    ns: numeric,
                    key,
                    amount,
                });
            }
            Ok(EffectExpr::NoOp)
        }
        "fact" => {
            if let Some((key, value)) = rest.split_once('=') {
                let key = key.trim();
                // Tolerates '==' written in effect position.
                let value = value.trim_start_matches('=').trim();
                if !is_valid_key(key) {
                    return Err(malformed("invalid fact key"));
                }
                if value.is_empty() {
                    return Err(malformed("empty fact value"));
                }
                return Ok(EffectExpr::FactAssign {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            let key = rest.trim();
            if is_valid_key(key) {
                Ok(EffectExpr::FactVerify(key.to_string()))
            } else {
                Err(malformed("invalid fact key"))
            }
        }
        other => Err(malformed(&format!("unknown namespace '{other}'"))),
    }
}

/// Split `"<ns>:<rest>"` at the first colon. Returns `None` for the
/// legacy colon-free form.
fn split_namespace(input: &str) -> Option<(&str, &str)> {
    let (ns, rest) = input.split_once(':')?;
    Some((ns.trim(), rest.trim()))
}

/// Parse a tag rest: `"!name"` → negated, bare `"name"` → plain.
/// Returns `None` when the name is empty.
fn parse_tag_name(input: &str) -> Option<(String, bool)> {
    let (name, negated) = match input.strip_prefix('!') {
        Some(stripped) => (stripped.trim(), true),
        None => (input, false),
    };
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), negated))
}

/// Identifier: letter or underscore start, then word chars and dots.
/// Dots allow scoped goal keys like `interrogator.getConfession`.
fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Decimal number, optionally signed. Stricter than `f64::from_str`:
/// no exponents, no inf/NaN.
fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let unsigned = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed);
    if unsigned.is_empty() {
        return None;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    trimmed.parse().ok()
}

/// `<key> <op> <number>` with any of the six comparison operators.
/// Two-character operators are tried first so `>=` never parses as `>`.
fn parse_comparison(rest: &str) -> Option<(String, CompareOp, f64)> {
    const OPS: [(&str, CompareOp); 6] = [
        ("==", CompareOp::Eq),
        ("!=", CompareOp::Ne),
        (">=", CompareOp::Ge),
        ("<=", CompareOp::Le),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];
    for (symbol, op) in OPS {
        if let Some((key, value)) = rest.split_once(symbol) {
            let key = key.trim();
            if !is_valid_key(key) {
                return None;
            }
            let value = parse_number(value)?;
            return Some((key.to_string(), op, value));
        }
    }
    None
}

/// `<key> (== | !=) <token>` for fact guards.
fn parse_fact_comparison(rest: &str) -> Option<(String, String, bool)> {
    for (symbol, negated) in [("==", false), ("!=", true)] {
        if let Some((key, token)) = rest.split_once(symbol) {
            return Some((key.trim().to_string(), token.trim().to_string(), negated));
        }
    }
    None
}

/// `<key> = <number>` (exactly one `=`, not `==`).
fn parse_assignment(rest: &str) -> Option<(String, f64)> {
    let (key, value) = rest.split_once('=')?;
    if value.starts_with('=') {
        return None;
    }
    let key = key.trim();
    if !is_valid_key(key) {
        return None;
    }
    Some((key.to_string(), parse_number(value)?))
}

/// `<key> (+|-) <number>` — the number may carry its own sign, so
/// `trust-2` and `trust+-2` both read as a delta of -2.
fn parse_delta(rest: &str) -> Option<(String, f64)> {
    let split_at = rest.find(['+', '-'])?;
    let key = rest[..split_at].trim();
    if !is_valid_key(key) {
        return None;
    }
    let sign = if rest.as_bytes()[split_at] == b'-' { -1.0 } else { 1.0 };
    let magnitude = parse_number(&rest[split_at + 1..])?;
    Some((key.to_string(), sign * magnitude))
}
