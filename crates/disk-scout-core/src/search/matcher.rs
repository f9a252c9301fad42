use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Decides whether a candidate name matches the query, and how well.
#[derive(Debug)]
pub enum NameMatcher {
    /// Compiled case-insensitive pattern; quality is binary.
    Regex(Regex),
    /// Case-insensitive containment. Also the silent fallback for an
    /// invalid regex, so malformed patterns never fail a search.
    Substring(String),
    Fuzzy(PrefixMatcher),
}

impl NameMatcher {
    pub fn compile(query: &str, use_regex: bool) -> Self {
        if use_regex {
            match RegexBuilder::new(query).case_insensitive(true).build() {
                Ok(re) => NameMatcher::Regex(re),
                Err(err) => {
                    debug!(
                        "Invalid search pattern '{}', falling back to substring: {}",
                        query, err
                    );
                    NameMatcher::Substring(query.to_lowercase())
                }
            }
        } else {
            NameMatcher::Fuzzy(PrefixMatcher::new(query))
        }
    }

    /// Match quality in (0, 1], or `None` for no match.
    pub fn match_quality(&self, name: &str) -> Option<f64> {
        match self {
            NameMatcher::Regex(re) => re.is_match(name).then_some(1.0),
            NameMatcher::Substring(needle) => {
                if needle.is_empty() {
                    return None;
                }
                name.to_lowercase().contains(needle.as_str()).then_some(1.0)
            }
            NameMatcher::Fuzzy(matcher) => matcher.match_quality(name),
        }
    }
}

/// Progressive prefix-fallback matching for typo tolerance.
///
/// Prefixes of the query are tried longest first, down to the greater of 3
/// characters or 40% of the query length. The first prefix contained
/// case-insensitively in the name decides the match; quality is the matched
/// prefix length over the query length, so a full match scores 1.0 and
/// shorter prefixes proportionally less. No edit-distance computation.
#[derive(Debug)]
pub struct PrefixMatcher {
    /// Lower-cased, longest first.
    prefixes: Vec<String>,
    query_len: usize,
}

impl PrefixMatcher {
    pub fn new(query: &str) -> Self {
        let chars: Vec<char> = query.to_lowercase().chars().collect();
        let query_len = chars.len();
        let min_len = min_prefix_len(query_len);

        let mut prefixes = Vec::new();
        let mut len = query_len;
        while len >= min_len && len > 0 {
            prefixes.push(chars[..len].iter().collect());
            len -= 1;
        }

        Self {
            prefixes,
            query_len,
        }
    }

    pub fn match_quality(&self, name: &str) -> Option<f64> {
        if self.query_len == 0 {
            return None;
        }
        let haystack = name.to_lowercase();
        for prefix in &self.prefixes {
            if haystack.contains(prefix.as_str()) {
                return Some(prefix.chars().count() as f64 / self.query_len as f64);
            }
        }
        None
    }
}

/// Never shorter than the greater of 3 characters or 40% of the query, but
/// a query shorter than that floor only gets its full length.
fn min_prefix_len(query_len: usize) -> usize {
    let forty_percent = (query_len as f64 * 0.4).ceil() as usize;
    forty_percent.max(3).min(query_len.max(1))
}
