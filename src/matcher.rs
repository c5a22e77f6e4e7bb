//! Route pattern matching and URL generation
//!
//! Patterns use the `/users/:id` grammar:
//!
//! - `users` - static segment, must match exactly
//! - `:id` - parameter, captures one segment
//! - `:id<\d+>` / `:id<uuid>` - constrained parameter
//! - `*` - wildcard, captures the rest of the path as the `*` argument
//!
//! The same pattern is used in both directions: [`RoutePattern::matches`]
//! extracts arguments from a path, [`RoutePattern::link`] substitutes them back.

use crate::params::{decode_component, encode_component, RouteParams};

/// Argument name under which a wildcard stores the remaining path
pub const WILDCARD_ARG: &str = "*";

/// A parsed route pattern with its matching priority
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    /// Pattern segments
    pub segments: Vec<Segment>,
    /// Matching priority (higher = matched first)
    pub priority: u8,
}

impl RoutePattern {
    /// Parse a pattern
    ///
    /// Examples:
    /// - "/users" -> static segments, priority 100
    /// - "/users/:id" -> one parameter, priority 90
    /// - "/files/*" -> wildcard, priority 0
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<Segment> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        let priority = Self::calculate_priority(&segments);

        Self { segments, priority }
    }

    /// Each parameter costs 10 points; any wildcard drops the pattern to 0
    fn calculate_priority(segments: &[Segment]) -> u8 {
        let mut priority: u8 = 100;

        for segment in segments {
            match segment {
                Segment::Static(_) => {}
                Segment::Param { .. } => {
                    priority = priority.saturating_sub(10);
                }
                Segment::Wildcard => return 0,
            }
        }

        priority
    }

    /// Match this pattern against a URL path
    ///
    /// Returns decoded arguments if matched.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = RouteParams::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    let actual = path_segments.get(idx)?;
                    if decode_component(actual) != *expected {
                        return None;
                    }
                }
                Segment::Param { name, constraint } => {
                    let value = decode_component(path_segments.get(idx)?);
                    if let Some(constraint) = constraint {
                        if !constraint.validate(&value) {
                            return None;
                        }
                    }
                    params.insert(name.clone(), value);
                }
                Segment::Wildcard => {
                    let rest: Vec<String> = path_segments[idx.min(path_segments.len())..]
                        .iter()
                        .map(|s| decode_component(s))
                        .collect();
                    params.insert(WILDCARD_ARG, rest.join("/"));
                    return Some(params);
                }
            }
        }

        if self.segments.len() == path_segments.len() {
            Some(params)
        } else {
            None
        }
    }

    /// Produce the URL path for this pattern
    ///
    /// Returns the name of the first missing argument on failure. A missing
    /// wildcard argument is treated as empty.
    pub fn link(&self, args: &RouteParams) -> Result<String, String> {
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Static(text) => parts.push(encode_component(text)),
                Segment::Param { name, .. } => {
                    let value = args.get(name).ok_or_else(|| name.clone())?;
                    parts.push(encode_component(value));
                }
                Segment::Wildcard => {
                    if let Some(rest) = args.get(WILDCARD_ARG) {
                        parts.extend(
                            rest.split('/')
                                .filter(|s| !s.is_empty())
                                .map(encode_component),
                        );
                    }
                }
            }
        }

        Ok(format!("/{}", parts.join("/")))
    }

    /// Names of all parameters, in pattern order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A single segment in a route pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Static text that must match exactly
    Static(String),
    /// Parameter that captures a value
    Param {
        name: String,
        constraint: Option<Constraint>,
    },
    /// Wildcard that matches everything after it
    Wildcard,
}

impl Segment {
    /// Parse a segment from string
    ///
    /// Examples:
    /// - "users" -> Static("users")
    /// - ":id" -> Param { name: "id", constraint: None }
    /// - ":id<\\d+>" -> Param { name: "id", constraint: Some(Numeric) }
    /// - "*" -> Wildcard
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            return Segment::Wildcard;
        }

        let Some(rest) = s.strip_prefix(':') else {
            return Segment::Static(s.to_string());
        };

        match rest.split_once('<') {
            Some((name, constraint)) => Segment::Param {
                name: name.to_string(),
                constraint: Constraint::parse(constraint.trim_end_matches('>')),
            },
            None => Segment::Param {
                name: rest.to_string(),
                constraint: None,
            },
        }
    }
}

/// Constraint for validating parameter values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// ASCII digits only (`<\d+>`)
    Numeric,
    /// Hyphenated UUID (`<uuid>`)
    Uuid,
}

impl Constraint {
    /// Parse the text between `<` and `>`; unknown constraints yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "\\d+" => Some(Constraint::Numeric),
            "uuid" => Some(Constraint::Uuid),
            _ => None,
        }
    }

    /// Validate a value against this constraint
    pub fn validate(self, value: &str) -> bool {
        match self {
            Constraint::Numeric => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
            Constraint::Uuid => {
                let parts: Vec<&str> = value.split('-').collect();
                if parts.len() != 5 {
                    return false;
                }

                parts[0].len() == 8
                    && parts[1].len() == 4
                    && parts[2].len() == 4
                    && parts[3].len() == 4
                    && parts[4].len() == 12
                    && parts
                        .iter()
                        .all(|p| p.chars().all(|c| c.is_ascii_hexdigit()))
            }
        }
    }
}
