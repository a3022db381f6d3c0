use std::hash::Hash;
use regex_lite as regex;
use crate::routing::error::RoutingError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatcherKind {
    Exact,
    Prefix,
    Regex,
}

#[derive(Debug, Clone)]
pub struct PathMatcher {
    pub kind: PathMatcherKind,
    pub pattern: String,
    regex: Option<regex::Regex>,
}

impl PathMatcher {
    pub fn from_str(pattern: &str) -> Result<Self, RoutingError> {
        if pattern.is_empty() {
            return Err(RoutingError::InvalidPathPattern {
                pattern: pattern.to_string(),
                reason: "빈 패턴".to_string(),
            });
        }

        if pattern.starts_with('^') {
            // 정규식 매칭
            let re = regex::Regex::new(pattern)
                .map_err(|e| RoutingError::InvalidPathPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(PathMatcher {
                kind: PathMatcherKind::Regex,
                pattern: pattern.to_string(),
                regex: Some(re),
            })
        } else if pattern.ends_with('*') {
            // '*' 패턴을 제거하고 Prefix로 처리
            Ok(PathMatcher {
                kind: PathMatcherKind::Prefix,
                pattern: pattern.trim_end_matches('*').to_string(),
                regex: None,
            })
        } else if pattern.ends_with('/') {
            // 디렉터리 스타일 패턴과 루트 "/"는 Prefix로 처리. 루트는 모든
            // 경로와 매칭되므로 Exact로 두면 더 긴 접두사 규칙을 동률에서
            // 이겨버림
            Ok(PathMatcher {
                kind: PathMatcherKind::Prefix,
                pattern: pattern.to_string(),
                regex: None,
            })
        } else {
            Ok(PathMatcher {
                kind: PathMatcherKind::Exact,
                pattern: pattern.to_string(),
                regex: None,
            })
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.pattern == "/" {
            return true;
        }

        match self.kind {
            PathMatcherKind::Exact => self.pattern == path,
            PathMatcherKind::Prefix => {
                // Traefik 스타일: 접두사 매칭에서는 trailing slash 무시
                let pattern = self.pattern.trim_end_matches('/');
                let path = path.trim_end_matches('/');
                path == pattern || path.starts_with(&format!("{}/", pattern))
            },
            PathMatcherKind::Regex => self.regex.as_ref()
                .map(|r| r.is_match(path))
                .unwrap_or(false),
        }
    }

    /// 패턴의 구체성을 반환합니다. 값이 클수록 더 구체적인 패턴입니다.
    ///
    /// Exact 매칭이 Prefix 매칭보다 우선하고, 같은 종류 안에서는
    /// 와일드카드 앞의 리터럴 접두사가 긴 쪽이 우선합니다.
    pub fn specificity(&self) -> (u8, usize) {
        match self.kind {
            PathMatcherKind::Exact => (2, self.pattern.len()),
            PathMatcherKind::Prefix => (1, self.pattern.trim_end_matches('/').len()),
            PathMatcherKind::Regex => (0, self.literal_prefix_len()),
        }
    }

    // 정규식 패턴에서 메타 문자가 나오기 전까지의 리터럴 길이
    fn literal_prefix_len(&self) -> usize {
        self.pattern
            .trim_start_matches('^')
            .chars()
            .take_while(|c| !matches!(c, '.' | '*' | '+' | '?' | '[' | '(' | '\\' | '$' | '{' | '|'))
            .count()
    }
}

impl PartialEq for PathMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.pattern == other.pattern
    }
}

impl Eq for PathMatcher {}

impl Hash for PathMatcher {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.pattern.hash(state);
    }
}
