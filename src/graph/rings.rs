//! Fraud-ring membership index
//!
//! Flattens the member lists of every ring into one set so node building can
//! ask "is this account in any ring?" in O(1).

use std::collections::{HashMap, HashSet};

use super::types::FraudRing;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingMembershipIndex {
    members: HashSet<String>,
    /// Ring ids per account, in ring order, no repeats
    rings_by_account: HashMap<String, Vec<String>>,
}

impl RingMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of `member_accounts` across all rings.
    pub fn build(rings: &[FraudRing]) -> Self {
        let mut index = Self::new();
        for ring in rings {
            for account in &ring.member_accounts {
                index.members.insert(account.clone());
                let ring_ids = index.rings_by_account.entry(account.clone()).or_default();
                if !ring_ids.contains(&ring.ring_id) {
                    ring_ids.push(ring.ring_id.clone());
                }
            }
        }
        index
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.members.contains(account_id)
    }

    /// Rings the account belongs to (empty slice if none)
    pub fn rings_for(&self, account_id: &str) -> &[String] {
        self.rings_by_account
            .get(account_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::PatternType;

    #[test]
    fn empty_rings_give_empty_index() {
        let index = RingMembershipIndex::build(&[]);
        assert!(index.is_empty());
        assert!(!index.contains("A"));
        assert!(index.rings_for("A").is_empty());
    }

    #[test]
    fn overlapping_members_appear_once() {
        let rings = vec![
            FraudRing::new("R1", PatternType::Cycle, ["A", "B", "C"]),
            FraudRing::new("R2", PatternType::Smurfing, ["C", "D"]),
            FraudRing::new("R3", PatternType::FanIn, ["A", "A"]),
        ];
        let index = RingMembershipIndex::build(&rings);

        assert_eq!(index.len(), 4);
        for id in ["A", "B", "C", "D"] {
            assert!(index.contains(id));
        }
        assert!(!index.contains("E"));
        assert_eq!(index.rings_for("C"), ["R1", "R2"]);
        assert_eq!(index.rings_for("A"), ["R1", "R3"]);
    }

    #[test]
    fn ring_without_members_is_harmless() {
        let rings = vec![FraudRing::new("R1", PatternType::Other, Vec::<String>::new())];
        assert!(RingMembershipIndex::build(&rings).is_empty());
    }
}
