//! Mutual-exclusion rules over a package set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    #[default]
    AtMostOne,
    ExactlyOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    #[serde(default = "default_rule_name")]
    pub name: String,
    #[serde(default)]
    pub group: Vec<String>,
    #[serde(default)]
    pub mode: ConflictMode,
}

fn default_rule_name() -> String {
    "conflict".to_string()
}

impl ConflictRule {
    pub fn new(name: &str, group: &[&str], mode: ConflictMode) -> Self {
        Self {
            name: name.to_string(),
            group: group.iter().map(|s| s.to_string()).collect(),
            mode,
        }
    }
}

/// One broken rule with the group members found in the set, in group order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: String,
    pub mode: ConflictMode,
    pub present: Vec<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = if self.present.is_empty() {
            "none".to_string()
        } else {
            format!("[{}]", self.present.join(", "))
        };
        match self.mode {
            ConflictMode::ExactlyOne => {
                write!(f, "{}: expected exactly 1, found: {}", self.rule, present)
            }
            ConflictMode::AtMostOne => write!(f, "{}: too many selected: {}", self.rule, present),
        }
    }
}

/// Check `selected` against every rule. Pure; output follows rule order.
pub fn evaluate(selected: &BTreeSet<String>, rules: &[ConflictRule]) -> Vec<Violation> {
    rules
        .iter()
        .filter_map(|rule| {
            let present: Vec<String> = rule
                .group
                .iter()
                .filter(|p| selected.contains(p.as_str()))
                .cloned()
                .collect();
            let broken = match rule.mode {
                ConflictMode::ExactlyOne => present.len() != 1,
                ConflictMode::AtMostOne => present.len() > 1,
            };
            broken.then(|| Violation {
                rule: rule.name.clone(),
                mode: rule.mode,
                present,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exactly_one_needs_one_member() {
        let rules = vec![ConflictRule::new(
            "greeter",
            &["greetd", "sddm", "gdm"],
            ConflictMode::ExactlyOne,
        )];

        assert_eq!(evaluate(&set(&[]), &rules).len(), 1);
        assert!(evaluate(&set(&["sddm", "git"]), &rules).is_empty());
        let v = evaluate(&set(&["gdm", "greetd"]), &rules);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].present, vec!["greetd", "gdm"]);
    }

    #[test]
    fn at_most_one_allows_zero_and_one() {
        let rules = vec![ConflictRule::new(
            "audio",
            &["pulseaudio", "pipewire-pulse"],
            ConflictMode::AtMostOne,
        )];

        assert!(evaluate(&set(&[]), &rules).is_empty());
        assert!(evaluate(&set(&["pulseaudio"]), &rules).is_empty());
        assert_eq!(
            evaluate(&set(&["pulseaudio", "pipewire-pulse"]), &rules).len(),
            1
        );
    }

    #[test]
    fn messages_name_rule_and_members() {
        let rules = vec![
            ConflictRule::new("dm", &["sddm", "gdm"], ConflictMode::ExactlyOne),
            ConflictRule::new("audio", &["a", "b"], ConflictMode::AtMostOne),
        ];
        let msgs: Vec<String> = evaluate(&set(&["a", "b"]), &rules)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            msgs,
            vec![
                "dm: expected exactly 1, found: none",
                "audio: too many selected: [a, b]",
            ]
        );
    }

    #[test]
    fn mode_defaults_to_at_most_one() {
        let rule: ConflictRule = serde_json::from_str(r#"{"name":"x","group":["a","b"]}"#).unwrap();
        assert_eq!(rule.mode, ConflictMode::AtMostOne);
    }
}
