//! Regex-to-string generation.
//!
//! [`PatternGenerator`] produces a string that the given regular
//! expression would match. It is a generator, not a matcher: lookaround,
//! backreferences and POSIX classes are not interpreted.
//!
//! Supported syntax:
//!
//! | Syntax | Output |
//! |--------|--------|
//! | literal | copied through |
//! | `\d \D \w \W \s \S` | one char from the class |
//! | `\n \t \r` | newline / tab / carriage return |
//! | `[a-z0-9_]`, `[^...]` | one char from the set (negation draws printable ASCII) |
//! | `(a\|b)`, `(?:...)` | one alternative, chosen uniformly |
//! | `.` | one alphanumeric char |
//! | `* + ? {n} {n,} {n,m}` | 0–4, 1–4, 0–1, n, n..n+5, n..m repetitions |
//!
//! `^`, `$`, `\b` and friends are zero-width and produce nothing.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PatternError;

const DIGITS: &str = "0123456789";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^`{|}~";

/// Upper bound for `*` and `+`.
const MAX_OPEN_REPEAT: usize = 4;
/// Extra repetitions allowed by `{n,}`.
const OPEN_RANGE_SPAN: usize = 5;

/// Generates strings from regular-expression patterns.
pub struct PatternGenerator<R> {
    rng: R,
}

/// A single quantifiable unit of a pattern.
enum Atom<'p> {
    Literal(char),
    Escape(char),
    Class(&'p [char]),
    Group(&'p [char]),
    Any,
}

impl<R: Rng> PatternGenerator<R> {
    /// Create a generator drawing from `rng`. Pass `&mut rng` to borrow
    /// an RNG owned elsewhere.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Produce one string matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::EmptyPattern` for an empty pattern and
    /// `UnclosedGroup`/`UnclosedCharacterClass` for unbalanced brackets,
    /// wherever they occur in the pattern.
    pub fn generate(&mut self, pattern: &str) -> Result<String, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        let chars: Vec<char> = pattern.chars().collect();
        check_structure(&chars, pattern)?;

        let mut out = String::new();
        self.emit_alternation(&chars, &mut out);
        Ok(out)
    }

    fn emit_alternation(&mut self, s: &[char], out: &mut String) {
        let alternatives = split_alternatives(s);
        if let Some(chosen) = alternatives.choose(&mut self.rng) {
            self.emit_sequence(chosen, out);
        }
    }

    fn emit_sequence(&mut self, s: &[char], out: &mut String) {
        let mut i = 0;
        while i < s.len() {
            let (atom, next) = match s[i] {
                '\\' => match s.get(i + 1) {
                    Some(&c) => (Atom::Escape(c), i + 2),
                    None => (Atom::Literal('\\'), i + 1),
                },
                '[' => {
                    let end = class_end(s, i).unwrap_or(s.len());
                    (Atom::Class(&s[(i + 1).min(end)..end]), end + 1)
                }
                '(' => {
                    let end = group_end(s, i).unwrap_or(s.len());
                    (Atom::Group(&s[(i + 1).min(end)..end]), end + 1)
                }
                '.' => (Atom::Any, i + 1),
                // Anchors and stray quantifier characters are inert.
                '^' | '$' | '*' | '+' | '?' | '{' | '}' | ')' | '|' => {
                    i += 1;
                    continue;
                }
                c => (Atom::Literal(c), i + 1),
            };

            let (count, after) = self.quantifier(s, next);
            for _ in 0..count {
                self.emit_atom(&atom, out);
            }
            i = after;
        }
    }

    fn emit_atom(&mut self, atom: &Atom<'_>, out: &mut String) {
        match atom {
            Atom::Literal(c) => out.push(*c),
            Atom::Escape(c) => {
                if let Some(c) = self.escape_char(*c) {
                    out.push(c);
                }
            }
            Atom::Class(body) => {
                if let Some(c) = self.class_char(body) {
                    out.push(c);
                }
            }
            Atom::Group(body) => self.emit_group(body, out),
            Atom::Any => out.push(self.pick_from(&alphanumeric())),
        }
    }

    fn emit_group(&mut self, body: &[char], out: &mut String) {
        let body = match body {
            ['?', ':', rest @ ..] => rest,
            // Lookaround is zero-width.
            ['?', '=', ..] | ['?', '!', ..] | ['?', '<', '=', ..] | ['?', '<', '!', ..] => return,
            ['?', 'P', '<', ..] | ['?', '<', ..] => match body.iter().position(|c| *c == '>') {
                Some(close) => &body[close + 1..],
                None => body,
            },
            // Inline flags: `(?i)` emits nothing, `(?i:...)` emits its body.
            ['?', rest @ ..] => {
                let flags = rest
                    .iter()
                    .take_while(|c| c.is_ascii_alphabetic() || **c == '-')
                    .count();
                match rest.get(flags) {
                    None => return,
                    Some(':') => &rest[flags + 1..],
                    Some(_) => body,
                }
            }
            _ => body,
        };
        self.emit_alternation(body, out);
    }

    /// Parse a quantifier at `pos`. Returns the repetition count and the
    /// position after it (unchanged when there is none).
    fn quantifier(&mut self, s: &[char], pos: usize) -> (usize, usize) {
        let (count, mut next) = match s.get(pos) {
            Some('*') => (self.rng.gen_range(0..=MAX_OPEN_REPEAT), pos + 1),
            Some('+') => (self.rng.gen_range(1..=MAX_OPEN_REPEAT), pos + 1),
            Some('?') => (self.rng.gen_range(0..=1), pos + 1),
            Some('{') => match parse_braces(s, pos) {
                Some((min, max, end)) => (self.rng.gen_range(min..=max), end + 1),
                None => return (1, pos),
            },
            _ => return (1, pos),
        };
        // Lazy and possessive suffixes don't change what matches.
        if matches!(s.get(next), Some('?') | Some('+')) {
            next += 1;
        }
        (count, next)
    }

    fn escape_char(&mut self, c: char) -> Option<char> {
        match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                let alphabet = escape_alphabet(c);
                Some(self.pick_from(&alphabet))
            }
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            // Zero-width assertions.
            'b' | 'B' | 'A' | 'z' | 'Z' => None,
            other => Some(other),
        }
    }

    fn class_char(&mut self, body: &[char]) -> Option<char> {
        let (negated, body) = match body {
            ['^', rest @ ..] => (true, rest),
            _ => (false, body),
        };

        let mut set: Vec<char> = Vec::new();
        let mut i = 0;
        while i < body.len() {
            let c = body[i];
            if c == '\\' {
                if let Some(&escaped) = body.get(i + 1) {
                    match escaped {
                        'd' | 'D' | 'w' | 'W' | 's' | 'S' => set.extend(escape_alphabet(escaped)),
                        'n' => set.push('\n'),
                        't' => set.push('\t'),
                        'r' => set.push('\r'),
                        other => set.push(other),
                    }
                }
                i += 2;
                continue;
            }
            // Range like a-z; a trailing '-' is literal.
            if body.get(i + 1) == Some(&'-') && i + 2 < body.len() && body[i + 2] != '\\' {
                let end = body[i + 2];
                let (lo, hi) = if c <= end { (c, end) } else { (end, c) };
                set.extend(lo..=hi);
                i += 3;
                continue;
            }
            set.push(c);
            i += 1;
        }

        let candidates: Vec<char> = if negated {
            (' '..='~').filter(|c| !set.contains(c)).collect()
        } else {
            set.sort_unstable();
            set.dedup();
            set
        };
        candidates.choose(&mut self.rng).copied()
    }

    fn pick_from(&mut self, alphabet: &[char]) -> char {
        alphabet.choose(&mut self.rng).copied().unwrap_or('x')
    }
}

/// Generate one string for `pattern` using `rng`.
pub fn generate_from_pattern<R: Rng + ?Sized>(
    pattern: &str,
    rng: &mut R,
) -> Result<String, PatternError> {
    PatternGenerator::new(rng).generate(pattern)
}

fn alphanumeric() -> Vec<char> {
    LOWER.chars().chain(UPPER.chars()).chain(DIGITS.chars()).collect()
}

fn escape_alphabet(class: char) -> Vec<char> {
    match class {
        'd' => DIGITS.chars().collect(),
        'D' => (' '..='~').filter(|c| !c.is_ascii_digit()).collect(),
        'w' => {
            let mut word = alphanumeric();
            word.push('_');
            word
        }
        'W' => SYMBOLS.chars().filter(|c| *c != '_').collect(),
        's' => vec![' '],
        _ => alphanumeric(),
    }
}

/// Index of the `]` closing the class opened at `open`.
fn class_end(s: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if s.get(j) == Some(&'^') {
        j += 1;
    }
    // A leading ']' is a literal member.
    if s.get(j) == Some(&']') {
        j += 1;
    }
    while j < s.len() {
        match s[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

/// Index of the `)` closing the group opened at `open`.
fn group_end(s: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < s.len() {
        match s[j] {
            '\\' => j += 1,
            '[' => j = class_end(s, j)?,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Split on `|` outside groups and classes.
fn split_alternatives(s: &[char]) -> Vec<&[char]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut j = 0;
    while j < s.len() {
        match s[j] {
            '\\' => j += 1,
            '[' => j = class_end(s, j).unwrap_or(s.len()),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&s[start..j]);
                start = j + 1;
            }
            _ => {}
        }
        j += 1;
    }
    parts.push(&s[start.min(s.len())..]);
    parts
}

/// Parse `{n}`, `{n,}` or `{n,m}` at `open`. Returns (min, max, index of `}`).
fn parse_braces(s: &[char], open: usize) -> Option<(usize, usize, usize)> {
    let close = open + s[open..].iter().position(|c| *c == '}')?;
    let body: String = s[open + 1..close].iter().collect();
    let (min, max) = match body.split_once(',') {
        None => {
            let n = body.trim().parse::<usize>().ok()?;
            (n, n)
        }
        Some((lo, hi)) => {
            let lo = lo.trim().parse::<usize>().ok()?;
            if hi.trim().is_empty() {
                (lo, lo + OPEN_RANGE_SPAN)
            } else {
                let hi = hi.trim().parse::<usize>().ok()?;
                (lo, hi.max(lo))
            }
        }
    };
    Some((min, max, close))
}

/// Reject unbalanced classes and groups anywhere in the pattern, including
/// alternatives generation would not visit.
fn check_structure(s: &[char], pattern: &str) -> Result<(), PatternError> {
    let mut depth = 0usize;
    let mut j = 0;
    while j < s.len() {
        match s[j] {
            '\\' => j += 1,
            '[' => {
                j = class_end(s, j).ok_or_else(|| PatternError::UnclosedCharacterClass {
                    pattern: pattern.to_string(),
                })?;
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        j += 1;
    }
    if depth > 0 {
        return Err(PatternError::UnclosedGroup {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}
