use std::collections::HashSet;
use tracing::{debug, warn};

use crate::routing::{RouteRule, RoutingError, RoutingWarning};

/// 라우팅 테이블을 관리하는 구조체입니다.
///
/// 규칙 목록과 함께 항상 존재하는 기본 풀을 가지며, 모든 요청 경로는
/// 정확히 하나의 풀로 해석됩니다.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    // 등록 순서가 곧 최종 동률 해소 기준이므로 Vec을 유지
    rules: Vec<RouteRule>,
    default_pool: String,
}

impl RoutingTable {
    /// 기본 풀만 가진 새로운 라우팅 테이블을 생성합니다.
    pub fn new(default_pool: impl Into<String>) -> Self {
        RoutingTable {
            rules: Vec::new(),
            default_pool: default_pool.into(),
        }
    }

    /// 라우팅 테이블에 새로운 규칙을 추가합니다.
    pub fn add_rule(&mut self, rule: RouteRule) {
        self.rules.push(rule);
    }

    /// 특정 풀을 향하는 규칙을 모두 제거합니다.
    pub fn remove_rules_for(&mut self, pool_id: &str) {
        self.rules.retain(|r| r.pool_id != pool_id);
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn default_pool(&self) -> &str {
        &self.default_pool
    }

    /// 요청 경로를 풀 식별자로 해석합니다.
    ///
    /// 1. 경로와 매칭되는 모든 규칙을 후보로 수집합니다.
    /// 2. 후보가 없으면 기본 풀을 반환합니다.
    /// 3. 우선순위 오름차순, 같은 우선순위에서는 더 구체적인 패턴 우선으로
    ///    정렬합니다. 안정 정렬이므로 완전한 동률은 먼저 등록된 규칙이 이깁니다.
    pub fn resolve(&self, request_path: &str) -> &str {
        let mut candidates: Vec<&RouteRule> = self.rules
            .iter()
            .filter(|r| r.matcher.matches(request_path))
            .collect();

        if candidates.is_empty() {
            debug!(path = %request_path, pool = %self.default_pool, "기본 풀로 라우팅");
            return &self.default_pool;
        }

        candidates.sort_by(|a, b| {
            a.priority.cmp(&b.priority)
                .then_with(|| b.matcher.specificity().cmp(&a.matcher.specificity()))
        });

        let selected = candidates[0];
        debug!(
            path = %request_path,
            pattern = %selected.matcher.pattern,
            priority = selected.priority,
            pool = %selected.pool_id,
            "라우팅 규칙 매칭"
        );
        &selected.pool_id
    }

    /// 테이블 전체를 검증합니다.
    ///
    /// 알 수 없는 풀을 참조하는 규칙은 에러이고, 동일 우선순위에 동일
    /// 구체성으로 겹치는 패턴은 경고로 보고됩니다. 경고가 있어도 해석은
    /// 결정적으로 동작합니다 (먼저 등록된 규칙 선택).
    pub fn validate(&self, known_pools: &HashSet<String>) -> Result<Vec<RoutingWarning>, RoutingError> {
        if !known_pools.contains(&self.default_pool) {
            return Err(RoutingError::UnknownDefaultPool {
                pool_id: self.default_pool.clone(),
                known_pools: sorted(known_pools),
            });
        }

        for rule in &self.rules {
            if !known_pools.contains(&rule.pool_id) {
                return Err(RoutingError::UnknownPool {
                    pool_id: rule.pool_id.clone(),
                    known_pools: sorted(known_pools),
                });
            }
        }

        let mut warnings = Vec::new();
        for (i, first) in self.rules.iter().enumerate() {
            for second in &self.rules[i + 1..] {
                if first.priority == second.priority
                    && first.matcher.specificity() == second.matcher.specificity()
                    && overlaps(first, second)
                {
                    warnings.push(RoutingWarning::AmbiguousRules {
                        first_pattern: first.matcher.pattern.clone(),
                        second_pattern: second.matcher.pattern.clone(),
                        priority: first.priority,
                    });
                }
            }
        }

        for warning in &warnings {
            warn!(%warning, "라우팅 테이블 구성 경고");
        }

        Ok(warnings)
    }
}

// 두 규칙이 같은 경로를 받을 수 있는지 보수적으로 판단
fn overlaps(a: &RouteRule, b: &RouteRule) -> bool {
    a.matcher.matches(&b.matcher.pattern) || b.matcher.matches(&a.matcher.pattern)
}

fn sorted(pools: &HashSet<String>) -> Vec<String> {
    let mut v: Vec<String> = pools.iter().cloned().collect();
    v.sort();
    v
}
