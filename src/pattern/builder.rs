//! The inverse of pattern matching: filling parameter tokens with concrete
//! values to produce a path string.

use super::parser::{parse, PatternError, Token};
use crate::params::{Params, COMPONENT};

use percent_encoding::utf8_percent_encode;
use regex::Regex;

/// A value supplied for one parameter when building a path. Lists are only
/// valid for repeated (`+` / `*`) parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

/// Parameter values for [`PathBuilder::build`], in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs(Vec<(String, ParamValue)>);

impl BuildArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), ParamValue::Single(value.to_string())));
    }

    pub fn insert_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.push((key.into(), ParamValue::List(values)));
    }

    /// Chaining convenience for the common single-value case.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries whose keys are not in `consumed`, as a [`Params`] map. Used to
    /// serialize leftover parameters into a query string.
    pub(crate) fn leftover(&self, consumed: &[String]) -> Params {
        let mut params = Params::new();
        for (k, v) in &self.0 {
            if consumed.iter().any(|c| c == k) {
                continue;
            }
            match v {
                ParamValue::Single(s) => params.insert(k.clone(), s.clone()),
                ParamValue::List(vs) => {
                    for s in vs {
                        params.insert(k.clone(), s.clone());
                    }
                }
            }
        }
        params
    }
}

/// Raised when supplied values do not satisfy a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathBuildError {
    #[error("expected {name:?} to not repeat, but got an array")]
    UnexpectedRepeat { name: String },

    #[error("expected {name:?} to not be empty")]
    EmptyValue { name: String },

    #[error("expected {name:?} to match {pattern:?}, but got {actual:?}")]
    PatternMismatch {
        name: String,
        pattern: String,
        actual: String,
    },

    #[error("expected {name:?} to be {expected}")]
    Missing {
        name: String,
        expected: &'static str,
    },
}

/// Fills a pattern's tokens with parameter values.
#[derive(Debug)]
pub struct PathBuilder {
    tokens: Vec<Token>,
    /// Full-match validator per key token, in token order.
    validators: Vec<Regex>,
    source: String,
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

impl PathBuilder {
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let tokens = parse(source);
        let mut validators = Vec::new();
        for token in &tokens {
            if let Token::Key(k) = token {
                let re = Regex::new(&format!("^(?:{})$", k.pattern)).map_err(|e| {
                    PatternError {
                        pattern: source.to_string(),
                        message: e.to_string(),
                    }
                })?;
                validators.push(re);
            }
        }
        Ok(Self {
            tokens,
            validators,
            source: source.to_string(),
        })
    }

    /// Names of the parameters this pattern consumes.
    pub fn key_names(&self) -> Vec<String> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Key(k) => Some(k.name.to_string()),
                Token::Literal(_) => None,
            })
            .collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn build(&self, args: &BuildArgs) -> Result<String, PathBuildError> {
        let mut path = String::new();
        let mut validators = self.validators.iter();

        for token in &self.tokens {
            let key = match token {
                Token::Literal(s) => {
                    path.push_str(s);
                    continue;
                }
                Token::Key(k) => k,
            };
            let validator = validators.next();
            let accepts = |segment: &str| validator.map_or(true, |re| re.is_match(segment));
            let name = key.name.to_string();

            match args.get(&name) {
                Some(ParamValue::List(values)) => {
                    if !key.repeat {
                        return Err(PathBuildError::UnexpectedRepeat { name });
                    }
                    if values.is_empty() {
                        if key.optional {
                            continue;
                        }
                        return Err(PathBuildError::EmptyValue { name });
                    }
                    for (i, value) in values.iter().enumerate() {
                        let segment = encode_segment(value);
                        if !accepts(&segment) {
                            return Err(PathBuildError::PatternMismatch {
                                name,
                                pattern: key.pattern.clone(),
                                actual: segment,
                            });
                        }
                        if i == 0 {
                            path.push_str(&key.prefix);
                        } else {
                            path.push(key.delimiter);
                        }
                        path.push_str(&segment);
                    }
                }
                Some(ParamValue::Single(value)) => {
                    let segment = encode_segment(value);
                    if !accepts(&segment) {
                        return Err(PathBuildError::PatternMismatch {
                            name,
                            pattern: key.pattern.clone(),
                            actual: segment,
                        });
                    }
                    path.push_str(&key.prefix);
                    path.push_str(&segment);
                }
                None => {
                    if key.optional {
                        // A partial prefix is part of the surrounding literal
                        // text and stays even when the value is absent.
                        if key.partial {
                            path.push_str(&key.prefix);
                        }
                        continue;
                    }
                    let expected = if key.repeat { "an array" } else { "a string" };
                    return Err(PathBuildError::Missing { name, expected });
                }
            }
        }

        Ok(path)
    }
}
