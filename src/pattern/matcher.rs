//! Compilation of pattern tokens into a matching regular expression.

use super::parser::{parse, Key, Token, DEFAULT_DELIMITER, DELIMITERS};
use crate::params::Params;

use percent_encoding::percent_decode_str;
use regex::Regex;

pub use super::parser::PatternError;

/// Options controlling matcher construction.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Require the pattern to consume the entire input (exact match).
    pub end: bool,
    /// Disable the implicit optional trailing delimiter.
    pub strict: bool,
    /// Match case-sensitively. Off by default.
    pub sensitive: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            end: true,
            strict: false,
            sensitive: false,
        }
    }
}

/// Result of testing a pattern against a pathname: the consumed prefix and
/// the decoded parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub path: String,
    pub params: Params,
    /// Names of the keys contributing to this match, in pattern order.
    pub keys: Vec<String>,
}

/// A compiled test-and-extract function for one pattern source.
#[derive(Debug)]
pub struct Matcher {
    regex: Regex,
    keys: Vec<Key>,
    /// Capture index of the boundary group emulating the `(?=/|$)` lookahead
    /// in prefix mode; its text is not part of the consumed path.
    boundary_group: Option<usize>,
    source: String,
}

/// Decodes a percent-encoded path segment, falling back to the raw text when
/// the escape sequences are malformed.
fn decode_param(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn escape_char(c: char) -> String {
    regex::escape(&c.to_string())
}

/// Compiles one pattern source into a [`Matcher`].
pub fn compile(source: &str, opts: &CompileOptions) -> Result<Matcher, PatternError> {
    let tokens = parse(source);
    let mut keys: Vec<Key> = Vec::new();
    let mut route = String::new();
    if !opts.sensitive {
        route.push_str("(?i)");
    }
    route.push('^');

    let mut is_end_delimited = tokens.is_empty();
    let last = tokens.len().saturating_sub(1);

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(s) => {
                route.push_str(&regex::escape(s));
                is_end_delimited = i == last
                    && s.chars().last().map_or(false, |c| DELIMITERS.contains(c));
            }
            Token::Key(k) => {
                let capture = if k.repeat {
                    format!(
                        "(?:{})(?:{}(?:{}))*",
                        k.pattern,
                        escape_char(k.delimiter),
                        k.pattern
                    )
                } else {
                    k.pattern.clone()
                };
                let prefix = regex::escape(&k.prefix);
                if k.optional {
                    if k.partial {
                        route.push_str(&prefix);
                        route.push('(');
                        route.push_str(&capture);
                        route.push_str(")?");
                    } else {
                        route.push_str("(?:");
                        route.push_str(&prefix);
                        route.push('(');
                        route.push_str(&capture);
                        route.push_str("))?");
                    }
                } else {
                    route.push_str(&prefix);
                    route.push('(');
                    route.push_str(&capture);
                    route.push(')');
                }
                keys.push(k.clone());
                is_end_delimited = false;
            }
        }
    }

    let delim = escape_char(DEFAULT_DELIMITER);
    let mut boundary_group = None;
    if opts.end {
        if !opts.strict {
            route.push_str("(?:");
            route.push_str(&delim);
            route.push_str(")?");
        }
        route.push('$');
    } else {
        if !opts.strict {
            route.push_str("(?:");
            route.push_str(&delim);
            route.push_str("$)?");
        }
        if !is_end_delimited {
            boundary_group = Some(keys.len() + 1);
            route.push_str("(?:$|(");
            route.push_str(&delim);
            route.push_str("))");
        }
    }

    let regex = Regex::new(&route).map_err(|e| PatternError {
        pattern: source.to_string(),
        message: e.to_string(),
    })?;

    Ok(Matcher {
        regex,
        keys,
        boundary_group,
        source: source.to_string(),
    })
}

impl Matcher {
    /// Tests the pattern against the start of `pathname` and extracts the
    /// decoded parameters. Repeated captures are split on the key delimiter.
    pub fn test(&self, pathname: &str) -> Option<PathMatch> {
        let caps = self.regex.captures(pathname)?;
        let whole = caps.get(0)?;
        let mut consumed = whole.end();
        if let Some(group) = self.boundary_group {
            if let Some(m) = caps.get(group) {
                consumed -= m.as_str().len();
            }
        }

        let mut params = Params::new();
        let mut keys = Vec::with_capacity(self.keys.len());
        for (i, key) in self.keys.iter().enumerate() {
            let name = key.name.to_string();
            keys.push(name.clone());
            let m = match caps.get(i + 1) {
                Some(m) => m,
                None => continue,
            };
            if key.repeat {
                let values = m
                    .as_str()
                    .split(key.delimiter)
                    .map(decode_param)
                    .collect();
                params.replace(name, values);
            } else {
                params.replace(name, vec![decode_param(m.as_str())]);
            }
        }

        Some(PathMatch {
            path: pathname[..consumed].to_string(),
            params,
            keys,
        })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(source: &str) -> Matcher {
        compile(source, &CompileOptions::default()).unwrap()
    }

    fn prefix(source: &str) -> Matcher {
        let opts = CompileOptions {
            end: false,
            strict: source.is_empty(),
            ..CompileOptions::default()
        };
        compile(source, &opts).unwrap()
    }

    #[test]
    fn exact_literal() {
        let m = exact("/stories");
        assert!(m.test("/stories").is_some());
        // implicit optional trailing slash
        assert!(m.test("/stories/").is_some());
        assert!(m.test("/stories/1").is_none());
        assert!(m.test("/storie").is_none());
    }

    #[test]
    fn named_param_extraction() {
        let m = exact("/user/:id");
        let pm = m.test("/user/42").unwrap();
        assert_eq!(pm.params.get("id"), Some("42"));
        assert_eq!(pm.path, "/user/42");
        assert_eq!(pm.keys, vec!["id".to_string()]);
    }

    #[test]
    fn percent_decoding() {
        let m = exact("/tag/:name");
        let pm = m.test("/tag/caf%C3%A9").unwrap();
        assert_eq!(pm.params.get("name"), Some("café"));
    }

    #[test]
    fn repeated_param_splits_on_delimiter() {
        let m = exact("/files/:path+");
        let pm = m.test("/files/a/b/c").unwrap();
        assert_eq!(
            pm.params.get_all("path").unwrap(),
            ["a", "b", "c"]
        );
    }

    #[test]
    fn optional_param() {
        let m = exact("/posts/:page?");
        assert_eq!(m.test("/posts").unwrap().params.get("page"), None);
        assert_eq!(
            m.test("/posts/2").unwrap().params.get("page"),
            Some("2")
        );
    }

    #[test]
    fn prefix_match_consumes_up_to_boundary() {
        let m = prefix("/user/:id");
        let pm = m.test("/user/42/posts").unwrap();
        assert_eq!(pm.path, "/user/42");
        assert_eq!(pm.params.get("id"), Some("42"));
    }

    #[test]
    fn prefix_match_consumes_trailing_slash_at_end() {
        let m = prefix("/user");
        assert_eq!(m.test("/user/").unwrap().path, "/user/");
        assert_eq!(m.test("/user").unwrap().path, "/user");
    }

    #[test]
    fn prefix_rejects_partial_segment() {
        let m = prefix("/user");
        assert!(m.test("/username").is_none());
    }

    #[test]
    fn empty_strict_pattern_consumes_nothing() {
        let m = prefix("");
        let pm = m.test("/anything").unwrap();
        assert_eq!(pm.path, "");
    }

    #[test]
    fn case_insensitive_by_default() {
        assert!(exact("/Stories").test("/stories").is_some());
        let opts = CompileOptions {
            sensitive: true,
            ..CompileOptions::default()
        };
        let m = compile("/Stories", &opts).unwrap();
        assert!(m.test("/stories").is_none());
    }

    #[test]
    fn custom_capture_group() {
        let m = exact("/icon-:res(\\d+).png");
        let pm = m.test("/icon-64.png").unwrap();
        assert_eq!(pm.params.get("res"), Some("64"));
        assert!(m.test("/icon-lg.png").is_none());
    }

    #[test]
    fn bare_group_gets_positional_name() {
        let m = exact("/(user|u)/:id");
        let pm = m.test("/u/7").unwrap();
        assert_eq!(pm.params.get("0"), Some("u"));
        assert_eq!(pm.params.get("id"), Some("7"));
    }
}
