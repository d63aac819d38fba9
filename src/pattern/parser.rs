//! Tokenizer for express-style path patterns.
//!
//! A pattern is a sequence of literal fragments and parameter descriptors:
//! `:name`, optionally followed by a custom capture `(regex)` and a modifier
//! (`+`, `*` or `?`). Bare `(regex)` groups become positionally-named keys.
//! `\X` passes `X` through literally.

use std::fmt;

/// Default separator between path segments.
pub const DEFAULT_DELIMITER: char = '/';

/// Characters that may act as a parameter prefix.
pub const DELIMITERS: &str = "./";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyName {
    Name(String),
    /// Positional index assigned to a bare capture group.
    Index(usize),
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Name(s) => f.write_str(s),
            KeyName::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Descriptor of one parameter token in a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: KeyName,
    /// Delimiter character captured from the preceding literal, or empty.
    pub prefix: String,
    pub delimiter: char,
    pub optional: bool,
    pub repeat: bool,
    /// The prefix is shared with a non-delimiter following character.
    pub partial: bool,
    /// Inner regex fragment the captured value must satisfy.
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Key(Key),
}

/// Raised when a custom capture group is not a valid regular expression.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid path pattern {pattern:?}: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Escapes the characters that are significant inside a capture group.
fn escape_group(group: &str) -> String {
    let mut out = String::with_capacity(group.len());
    for c in group.chars() {
        if "=!:$/()".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn default_pattern(delimiter: char) -> String {
    let mut class = String::new();
    if delimiter == '.' {
        class.push('\\');
    }
    class.push(delimiter);
    format!("[^{}]+?", class)
}

/// Scans a `(...)` capture group starting at `open`. Returns the group body
/// and the index just past the closing paren, or `None` when unbalanced (the
/// caller then treats the paren as a literal).
fn scan_group(chars: &[char], open: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            ')' => {
                if out.is_empty() {
                    return None;
                }
                return Some((out, i + 1));
            }
            '\\' if i + 1 < chars.len() => {
                out.push('\\');
                out.push(chars[i + 1]);
                i += 2;
            }
            '(' => return None,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    None
}

/// Tokenizes a pattern string. Infallible: anything that is not a valid
/// parameter descriptor stays a literal.
pub fn parse(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut literal = String::new();
    let mut literal_escaped = false;
    let mut key_index = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            literal.push(chars[i + 1]);
            literal_escaped = true;
            i += 2;
            continue;
        }

        // Try to read a parameter descriptor at `i`.
        let parsed: Option<(KeyName, Option<String>, usize)> = if c == ':' {
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && is_word(chars[j]) {
                j += 1;
            }
            if j == start {
                None
            } else {
                let name: String = chars[start..j].iter().collect();
                let (group, after) = match chars.get(j) {
                    Some('(') => match scan_group(&chars, j) {
                        Some((g, after)) => (Some(g), after),
                        None => (None, j),
                    },
                    _ => (None, j),
                };
                Some((KeyName::Name(name), group, after))
            }
        } else if c == '(' {
            match scan_group(&chars, i) {
                Some((g, after)) => {
                    let name = KeyName::Index(key_index);
                    key_index += 1;
                    Some((name, Some(g), after))
                }
                None => None,
            }
        } else {
            None
        };

        let (name, group, mut end) = match parsed {
            Some(p) => p,
            None => {
                literal.push(c);
                i += 1;
                continue;
            }
        };

        let modifier = match chars.get(end) {
            Some(&m @ '+') | Some(&m @ '*') | Some(&m @ '?') => {
                end += 1;
                Some(m)
            }
            _ => None,
        };

        // A delimiter immediately preceding the parameter becomes its prefix.
        let mut prefix = String::new();
        if !literal_escaped {
            if let Some(last) = literal.chars().last() {
                if DELIMITERS.contains(last) {
                    prefix.push(last);
                    literal.pop();
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::replace(&mut literal, String::new())));
            literal_escaped = false;
        }

        let next = chars.get(end).copied();
        let partial = !prefix.is_empty() && next.is_some() && next != prefix.chars().next();
        let repeat = modifier == Some('+') || modifier == Some('*');
        let optional = modifier == Some('?') || modifier == Some('*');
        let delimiter = prefix.chars().next().unwrap_or(DEFAULT_DELIMITER);
        let pattern = match group {
            Some(g) => escape_group(&g),
            None => default_pattern(delimiter),
        };

        tokens.push(Token::Key(Key {
            name,
            prefix,
            delimiter,
            optional,
            repeat,
            partial,
            pattern,
        }));
        i = end;
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}
