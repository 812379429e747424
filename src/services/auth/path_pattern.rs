//! Ant-style path patterns.
//!
//! - `**` matches zero or more segments
//! - `*` inside a segment matches any run of characters (so a lone `*` is one segment)
//! - `?` matches exactly one character
//! - anything else is literal

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            raw: pattern.to_string(),
            segments: split(pattern).map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split(path).collect();
        let pattern: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match_segments(&pattern, &path)
    }
}

/// Ordered list of patterns; the first matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<PathPattern>,
}

impl PathMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| PathPattern::new(p.as_ref()))
                .collect(),
        }
    }

    pub fn first_match(&self, path: &str) -> Option<&PathPattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((head, rest)) => match path.split_first() {
            Some((segment, path_rest)) => {
                match_segment(head.as_bytes(), segment.as_bytes()) && match_segments(rest, path_rest)
            }
            None => false,
        },
    }
}

fn match_segment(pattern: &[u8], segment: &[u8]) -> bool {
    match pattern.split_first() {
        None => segment.is_empty(),
        Some((b'*', rest)) => (0..=segment.len()).any(|skip| match_segment(rest, &segment[skip..])),
        Some((b'?', rest)) => !segment.is_empty() && match_segment(rest, &segment[1..]),
        Some((c, rest)) => segment.first() == Some(c) && match_segment(rest, &segment[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_match_exactly() {
        let p = PathPattern::new("/api/v1/auth/login");
        assert!(p.matches("/api/v1/auth/login"));
        assert!(p.matches("/api/v1/auth/login/"));
        assert!(!p.matches("/api/v1/auth/logins"));
        assert!(!p.matches("/api/v1/auth"));
        assert!(!p.matches("/api/v1/auth/login/extra"));
    }

    #[test]
    fn double_star_spans_any_depth() {
        let p = PathPattern::new("/api/v1/auth/**");
        assert!(p.matches("/api/v1/auth"));
        assert!(p.matches("/api/v1/auth/login"));
        assert!(p.matches("/api/v1/auth/a/b/c"));
        assert!(!p.matches("/api/v1/authx"));
        assert!(!p.matches("/api/v2/auth/login"));

        let all = PathPattern::new("/**");
        assert!(all.matches("/"));
        assert!(all.matches("/anything/at/all"));
    }

    #[test]
    fn single_star_is_one_segment() {
        let p = PathPattern::new("/users/*/posts");
        assert!(p.matches("/users/42/posts"));
        assert!(!p.matches("/users/posts"));
        assert!(!p.matches("/users/1/2/posts"));
    }

    #[test]
    fn wildcards_inside_segments() {
        assert!(PathPattern::new("/static/*.css").matches("/static/site.css"));
        assert!(!PathPattern::new("/static/*.css").matches("/static/site.js"));
        assert!(PathPattern::new("/v?/health").matches("/v1/health"));
        assert!(!PathPattern::new("/v?/health").matches("/v10/health"));
    }

    #[test]
    fn matcher_returns_first_hit_in_order() {
        let m = PathMatcher::new(["/api/v1/auth/profile", "/api/v1/auth/**"]);

        let hit = m.first_match("/api/v1/auth/profile").unwrap();
        assert_eq!(hit.as_str(), "/api/v1/auth/profile");

        let hit = m.first_match("/api/v1/auth/login").unwrap();
        assert_eq!(hit.as_str(), "/api/v1/auth/**");

        assert!(m.first_match("/api/v1/posts").is_none());
    }
}
