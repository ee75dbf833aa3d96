//! Consensus bucketing over role positions
//!
//! # Agreement predicate
//!
//! Two stances agree iff their [`normalize`]d forms are identical
//! (lowercase, punctuation stripped, whitespace collapsed). Statements
//! without a topic use their own normalized text as topic.
//!
//! For every topic, with `n` participating roles:
//!
//! | Condition | Bucket |
//! |-----------|--------|
//! | one stance held by all `n` roles | unanimous |
//! | a stance held by more than `n / 2` roles | majority (others on the topic → dissent) |
//! | otherwise | open (every stance listed) |
//!
//! Topics are emitted in normalized-topic order, stances by descending
//! support then normalized text, supporters by role id. The same input
//! therefore always yields the same buckets.

use super::parsing::Position;
use crate::core::string::normalize;
use crate::role::entities::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which bucket a consensus item landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusKind {
    Unanimous,
    Majority,
    Dissent,
    Open,
}

impl ConsensusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusKind::Unanimous => "unanimous",
            ConsensusKind::Majority => "majority",
            ConsensusKind::Dissent => "dissent",
            ConsensusKind::Open => "open",
        }
    }
}

impl std::fmt::Display for ConsensusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stance on a topic together with the roles holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusItem {
    pub topic: String,
    pub stance: String,
    pub supporters: Vec<RoleId>,
}

impl ConsensusItem {
    pub fn support(&self) -> usize {
        self.supporters.len()
    }
}

/// Positions partitioned by level of agreement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusBuckets {
    pub participants: usize,
    pub unanimous: Vec<ConsensusItem>,
    pub majority: Vec<ConsensusItem>,
    pub dissent: Vec<ConsensusItem>,
    pub open: Vec<ConsensusItem>,
}

#[derive(Default)]
struct StanceGroup {
    display: Option<String>,
    supporters: BTreeSet<RoleId>,
}

#[derive(Default)]
struct TopicGroup {
    display: Option<String>,
    stances: BTreeMap<String, StanceGroup>,
}

impl ConsensusBuckets {
    /// Partition the positions of the participating roles.
    ///
    /// `positions` holds one entry per participating role; a role listed
    /// with no positions still counts toward `n`.
    pub fn build(positions: &[(RoleId, Vec<Position>)]) -> Self {
        let mut ordered: Vec<&(RoleId, Vec<Position>)> = positions.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        ordered.dedup_by(|a, b| a.0 == b.0);
        let participants = ordered.len();

        let mut topics: BTreeMap<String, TopicGroup> = BTreeMap::new();
        for (role, role_positions) in ordered {
            for position in role_positions {
                let stance_key = normalize(&position.stance);
                if stance_key.is_empty() {
                    continue;
                }
                let (topic_key, topic_display) = match &position.topic {
                    Some(topic) if !normalize(topic).is_empty() => (normalize(topic), topic.trim()),
                    _ => (stance_key.clone(), position.stance.trim()),
                };

                let topic = topics.entry(topic_key).or_default();
                topic.display.get_or_insert_with(|| topic_display.to_string());
                let stance = topic.stances.entry(stance_key).or_default();
                stance
                    .display
                    .get_or_insert_with(|| position.stance.trim().to_string());
                stance.supporters.insert(role.clone());
            }
        }

        let mut buckets = ConsensusBuckets {
            participants,
            ..Default::default()
        };

        for (_, topic) in topics {
            let topic_display = topic.display.unwrap_or_default();
            let mut items: Vec<ConsensusItem> = topic
                .stances
                .into_values()
                .map(|s| ConsensusItem {
                    topic: topic_display.clone(),
                    stance: s.display.unwrap_or_default(),
                    supporters: s.supporters.into_iter().collect(),
                })
                .collect();
            // BTreeMap already ordered by normalized stance; stable sort keeps that as tie-break
            items.sort_by(|a, b| b.support().cmp(&a.support()));

            let top = items[0].support();
            if items.len() == 1 && top == participants {
                buckets.unanimous.extend(items);
            } else if top * 2 > participants {
                let mut rest = items.split_off(1);
                buckets.majority.append(&mut items);
                buckets.dissent.append(&mut rest);
            } else {
                buckets.open.extend(items);
            }
        }

        buckets
    }

    /// Bucket of the item with this topic and stance, using the agreement predicate
    pub fn classify(&self, topic: &str, stance: &str) -> Option<ConsensusKind> {
        let (topic, stance) = (normalize(topic), normalize(stance));
        [
            (ConsensusKind::Unanimous, &self.unanimous),
            (ConsensusKind::Majority, &self.majority),
            (ConsensusKind::Dissent, &self.dissent),
            (ConsensusKind::Open, &self.open),
        ]
        .into_iter()
        .find(|(_, items)| {
            items
                .iter()
                .any(|i| normalize(&i.topic) == topic && normalize(&i.stance) == stance)
        })
        .map(|(kind, _)| kind)
    }

    pub fn is_empty(&self) -> bool {
        self.unanimous.is_empty()
            && self.majority.is_empty()
            && self.dissent.is_empty()
            && self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: &str, positions: &[(&str, &str)]) -> (RoleId, Vec<Position>) {
        (
            RoleId::new(id),
            positions
                .iter()
                .map(|(t, s)| {
                    let topic = (!t.is_empty()).then(|| t.to_string());
                    Position::new(topic, *s)
                })
                .collect(),
        )
    }

    #[test]
    fn test_unanimous() {
        let buckets = ConsensusBuckets::build(&[
            role("a", &[("db", "Use Postgres")]),
            role("b", &[("DB", "use postgres!")]),
            role("c", &[("db", "use  Postgres")]),
        ]);
        assert_eq!(buckets.unanimous.len(), 1);
        assert_eq!(buckets.unanimous[0].stance, "Use Postgres");
        assert_eq!(buckets.unanimous[0].support(), 3);
        assert!(buckets.majority.is_empty() && buckets.open.is_empty());
    }

    #[test]
    fn test_majority_with_named_dissent() {
        let buckets = ConsensusBuckets::build(&[
            role("a", &[("db", "postgres")]),
            role("b", &[("db", "postgres")]),
            role("c", &[("db", "sqlite")]),
        ]);
        assert_eq!(buckets.majority.len(), 1);
        assert_eq!(buckets.majority[0].stance, "postgres");
        assert_eq!(buckets.dissent.len(), 1);
        assert_eq!(buckets.dissent[0].stance, "sqlite");
        assert_eq!(buckets.dissent[0].supporters, vec![RoleId::new("c")]);
    }

    #[test]
    fn test_exact_half_is_open() {
        let buckets = ConsensusBuckets::build(&[
            role("a", &[("db", "postgres")]),
            role("b", &[("db", "postgres")]),
            role("c", &[("db", "sqlite")]),
            role("d", &[("db", "mysql")]),
        ]);
        assert!(buckets.majority.is_empty());
        assert_eq!(buckets.open.len(), 3);
        assert_eq!(buckets.open[0].stance, "postgres");
    }

    #[test]
    fn test_untopiced_statement_held_by_minority_is_open() {
        let buckets = ConsensusBuckets::build(&[
            role("a", &[("", "Add retries")]),
            role("b", &[("", "add retries")]),
            role("c", &[]),
        ]);
        assert_eq!(buckets.participants, 3);
        assert_eq!(buckets.majority.len(), 1);
        assert!(buckets.dissent.is_empty());

        let lonely = ConsensusBuckets::build(&[role("a", &[("", "x")]), role("b", &[])]);
        assert_eq!(lonely.open.len(), 1);
    }

    #[test]
    fn test_order_independent() {
        let forward = ConsensusBuckets::build(&[
            role("a", &[("db", "postgres"), ("cache", "redis")]),
            role("b", &[("db", "sqlite"), ("cache", "redis")]),
            role("c", &[("db", "postgres")]),
        ]);
        let reversed = ConsensusBuckets::build(&[
            role("c", &[("db", "postgres")]),
            role("b", &[("cache", "redis"), ("db", "sqlite")]),
            role("a", &[("cache", "redis"), ("db", "postgres")]),
        ]);
        assert_eq!(forward, reversed);
        assert_eq!(forward.classify("cache", "Redis"), Some(ConsensusKind::Majority));
        assert_eq!(forward.classify("db", "sqlite"), Some(ConsensusKind::Dissent));
        assert_eq!(forward.classify("db", "oracle"), None);
    }

    #[test]
    fn test_no_participants() {
        let buckets = ConsensusBuckets::build(&[]);
        assert!(buckets.is_empty());
        assert_eq!(buckets.participants, 0);
    }
}
