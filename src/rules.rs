//! Snort rule ingestion.
//!
//! Only the literal payload side of a rule matters here: every
//! `content:"…"` clause is lifted out, its `|68 65 78|` hex escapes are
//! decoded to raw bytes, and a trailing `nocase` modifier marks the
//! pattern caseless. The rule's `msg:"…"` and `sid:…` options ride along
//! as opaque metadata. Everything else in the rule is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::pattern::{Pattern, Patterns};
use crate::Result;

/// Read a ruleset file, one rule per line, and extract every content
/// pattern. Blank lines and `#` comments are skipped.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Patterns> {
    let file = File::open(path)?;
    parse_rules(BufReader::new(file))
}

/// Parse rules from any buffered reader, one rule per line.
pub fn parse_rules<R: BufRead>(reader: R) -> Result<Patterns> {
    let mut patterns = Patterns::new();

    for line in reader.lines() {
        let line = line?;
        let rule = line.trim();
        if rule.is_empty() || rule.starts_with('#') {
            continue;
        }
        parse_rule(rule, &mut patterns);
    }

    debug!("loaded {} content patterns", patterns.len());

    Ok(patterns)
}

/// Extract every `content:"…"` clause of a single rule into `out`.
/// Negated clauses (`content:!"…"`) and clauses with malformed hex
/// escapes are skipped.
pub fn parse_rule(rule: &str, out: &mut Patterns) {
    let msg = quoted_option(rule, "msg:");
    let sid = numeric_option(rule, "sid:");

    let mut rest = rule;
    while let Some(idx) = rest.find("content:") {
        rest = &rest[idx + "content:".len()..];

        let negated = rest.trim_start().starts_with('!');
        let open = match rest.find('"') {
            Some(open) => open,
            None => break,
        };
        let close = match rest[open + 1..].find('"') {
            Some(close) => open + 1 + close,
            None => break,
        };

        let raw = &rest[open + 1..close];
        rest = &rest[close + 1..];

        if negated {
            continue;
        }

        let bytes = match decode_content(raw) {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => continue,
        };

        // modifiers for this clause run until the next content clause
        let modifiers = match rest.find("content:") {
            Some(next) => &rest[..next],
            None => rest,
        };

        let mut pattern = Pattern::new(bytes);
        if modifiers.contains("nocase") {
            pattern = pattern.caseless();
        }
        if let Some(sid) = sid {
            pattern = pattern.sid(sid);
        }
        if let Some(msg) = msg {
            pattern = pattern.msg(msg);
        }

        out.push(pattern);
    }
}

/// Decode a content string, turning each `|hh hh …|` run into raw bytes.
/// Returns `None` when the pipes are unbalanced (an unterminated hex
/// escape) or a hex run is malformed.
fn decode_content(s: &str) -> Option<Vec<u8>> {
    if s.matches('|').count() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(s.len());

    for (i, segment) in s.split('|').enumerate() {
        if i % 2 == 0 {
            bytes.extend_from_slice(segment.as_bytes());
        } else {
            let hex: String = segment.chars().filter(|c| !c.is_whitespace()).collect();
            if hex.len() % 2 != 0 {
                return None;
            }
            for pair in hex.as_bytes().chunks(2) {
                let pair = core::str::from_utf8(pair).ok()?;
                bytes.push(u8::from_str_radix(pair, 16).ok()?);
            }
        }
    }

    Some(bytes)
}

fn quoted_option<'a>(rule: &'a str, key: &str) -> Option<&'a str> {
    let rest = &rule[rule.find(key)? + key.len()..];
    let open = rest.find('"')?;
    let close = rest[open + 1..].find('"')?;
    Some(&rest[open + 1..open + 1 + close])
}

fn numeric_option(rule: &str, key: &str) -> Option<u32> {
    let rest = rule[rule.find(key)? + key.len()..].trim_start();
    let digits: &str = match rest.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &rest[..end],
        None => rest,
    };
    digits.parse().ok()
}
