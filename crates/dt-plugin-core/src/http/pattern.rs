//! Route patterns: `/wp-admin/dt-plugin/general`, `/magic/{key}`,
//! `/assets/{*rest}`.
use std::collections::BTreeMap;
use std::fmt;

use crate::http::error::HttpError;
use crate::kernel::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Ordering key: more static segments first, then patterns without a
/// catch-all. Ties fall back to registration order in the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    static_segments: usize,
    exact: bool,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| HttpError::InvalidPattern { pattern: raw.to_string(), reason: reason.to_string() };
        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => {
                    let (catch_all, name) = match inner.strip_prefix('*') {
                        Some(name) => (true, name),
                        None => (false, inner),
                    };
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid("parameter names must be non-empty and alphanumeric").into());
                    }
                    if names.contains(&name) {
                        return Err(invalid("duplicate parameter name").into());
                    }
                    names.push(name);
                    if catch_all {
                        if index + 1 != parts.len() {
                            return Err(invalid("a catch-all must be the last segment").into());
                        }
                        Segment::CatchAll(name.to_string())
                    } else {
                        Segment::Param(name.to_string())
                    }
                }
                None if part.contains('{') || part.contains('}') => {
                    return Err(invalid("unbalanced braces").into());
                }
                None => Segment::Static(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self { raw: raw.to_string(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters when `path` matches.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = BTreeMap::new();
        let mut index = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*parts.get(index)?).to_string());
                }
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), parts[index.min(parts.len())..].join("/"));
                    return Some(params);
                }
            }
            index += 1;
        }

        (index == parts.len()).then_some(params)
    }

    pub fn specificity(&self) -> Specificity {
        Specificity {
            static_segments: self.segments.iter().filter(|s| matches!(s, Segment::Static(_))).count(),
            exact: !self.segments.iter().any(|s| matches!(s, Segment::CatchAll(_))),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
