//! Matching comment bodies against trigger phrases.

use regex::Regex;
use tracing::warn;

use crate::config::Trigger;
use crate::types::WorkflowId;

/// A comment that matched a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Group 0 is the whole comment; groups 1.. are the pattern's captures.
    /// An optional group that did not participate is an empty string.
    pub captured_groups: Vec<String>,
    pub workflows: Vec<WorkflowId>,
}

impl TriggerMatch {
    /// The first capture group, forwarded to workflows as `extra-args`.
    pub fn extra_args(&self) -> Option<&str> {
        self.captured_groups.get(1).map(String::as_str)
    }
}

/// Returns the first trigger, in configuration order, whose pattern matches
/// the entire comment body.
///
/// Patterns that fail to compile are logged and skipped.
pub fn match_trigger(triggers: &[Trigger], body: &str) -> Option<TriggerMatch> {
    for trigger in triggers {
        let re = match Regex::new(&format!("^{}$", trigger.pattern)) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern = %trigger.pattern, error = %e, "cannot compile trigger regex");
                continue;
            }
        };

        if let Some(caps) = re.captures(body) {
            let captured_groups = caps
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            return Some(TriggerMatch {
                captured_groups,
                workflows: trigger.workflows.clone(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggers(defs: &[(&str, &[&str])]) -> Vec<Trigger> {
        defs.iter()
            .map(|(pattern, workflows)| {
                Trigger::new(*pattern, workflows.iter().map(|w| WorkflowId::from(*w)).collect())
            })
            .collect()
    }

    #[test]
    fn exact_phrase_matches() {
        let m = match_trigger(&triggers(&[("/cute", &["cte.yaml"])]), "/cute").unwrap();
        assert_eq!(m.captured_groups, vec!["/cute"]);
        assert_eq!(m.workflows, vec![WorkflowId::from("cte.yaml")]);
        assert_eq!(m.extra_args(), None);
    }

    #[test]
    fn pattern_must_match_whole_comment() {
        let t = triggers(&[("/cute", &["cte.yaml"])]);
        assert_eq!(match_trigger(&t, "/cute cilium/cute-nationwide"), None);
        assert_eq!(match_trigger(&t, "please /cute"), None);
    }

    #[test]
    fn capture_group_becomes_extra_args() {
        let t = triggers(&[("/cute (.+)", &["cte.yaml"])]);
        let m = match_trigger(&t, r#"/cute {"repo":"zerohash"}"#).unwrap();
        assert_eq!(
            m.captured_groups,
            vec![r#"/cute {"repo":"zerohash"}"#, r#"{"repo":"zerohash"}"#]
        );
        assert_eq!(m.extra_args(), Some(r#"{"repo":"zerohash"}"#));
    }

    #[test]
    fn unmatched_optional_group_is_empty() {
        let t = triggers(&[("/ci-e2e( .+)?", &["e2e.yaml"])]);
        let m = match_trigger(&t, "/ci-e2e").unwrap();
        assert_eq!(m.captured_groups, vec!["/ci-e2e", ""]);
        assert_eq!(m.extra_args(), Some(""));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let t = triggers(&[(r"\invalid-reg-exp", &["invalid.yaml"]), ("/test", &["ci.yaml"])]);
        assert_eq!(match_trigger(&t, "/test invalid regex"), None);
        assert_eq!(
            match_trigger(&t, "/test").unwrap().workflows,
            vec![WorkflowId::from("ci.yaml")]
        );
    }

    #[test]
    fn first_matching_pattern_wins() {
        let t = triggers(&[("/test(.*)", &["all.yaml"]), ("/test-unit", &["unit.yaml"])]);
        let m = match_trigger(&t, "/test-unit").unwrap();
        assert_eq!(m.workflows, vec![WorkflowId::from("all.yaml")]);

        let reversed = triggers(&[("/test-unit", &["unit.yaml"]), ("/test(.*)", &["all.yaml"])]);
        let m = match_trigger(&reversed, "/test-unit").unwrap();
        assert_eq!(m.workflows, vec![WorkflowId::from("unit.yaml")]);
    }

    #[test]
    fn no_triggers_never_match() {
        assert_eq!(match_trigger(&[], "/test"), None);
    }
}
