// ABOUTME: Tier policy mapping membership tiers to the rooms they may not reserve
// ABOUTME: Injectable into the admission engine so deployments and tests can swap tables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Membership tier booking policy
//!
//! Each tier has a fixed set of rooms it cannot reserve. The default tables
//! mirror club policy: standard members are kept out of all recovery rooms,
//! platinum members out of the two premium ones, diamond members out of
//! nothing.

use std::collections::{HashMap, HashSet};

use crate::models::{MembershipTier, RoomName};

/// Blocked-room tables per membership tier
#[derive(Debug, Clone)]
pub struct TierPolicy {
    blocked: HashMap<MembershipTier, HashSet<RoomName>>,
}

impl TierPolicy {
    /// Build a policy from explicit (tier, blocked rooms) pairs
    #[must_use]
    pub fn new(entries: Vec<(MembershipTier, Vec<RoomName>)>) -> Self {
        let blocked = entries
            .into_iter()
            .map(|(tier, rooms)| (tier, rooms.into_iter().collect()))
            .collect();
        Self { blocked }
    }

    /// Whether `tier` is blocked from reserving `room`
    #[must_use]
    pub fn is_blocked(&self, tier: MembershipTier, room: RoomName) -> bool {
        self.blocked
            .get(&tier)
            .is_some_and(|rooms| rooms.contains(&room))
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::new(vec![
            (
                MembershipTier::Standard,
                vec![
                    RoomName::AromatherapyRoom,
                    RoomName::DefaultSauna,
                    RoomName::IceRoom,
                    RoomName::StreamSauna,
                ],
            ),
            (
                MembershipTier::Platinum,
                vec![RoomName::IceRoom, RoomName::AromatherapyRoom],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_is_blocked_from_recovery_rooms() {
        let policy = TierPolicy::default();
        assert!(policy.is_blocked(MembershipTier::Standard, RoomName::IceRoom));
        assert!(policy.is_blocked(MembershipTier::Standard, RoomName::DefaultSauna));
        assert!(!policy.is_blocked(MembershipTier::Standard, RoomName::TrainingRoom1));
    }

    #[test]
    fn platinum_is_blocked_from_premium_rooms_only() {
        let policy = TierPolicy::default();
        assert!(policy.is_blocked(MembershipTier::Platinum, RoomName::IceRoom));
        assert!(policy.is_blocked(MembershipTier::Platinum, RoomName::AromatherapyRoom));
        assert!(!policy.is_blocked(MembershipTier::Platinum, RoomName::DefaultSauna));
    }

    #[test]
    fn diamond_is_unrestricted() {
        let policy = TierPolicy::default();
        for room in RoomName::catalog() {
            assert!(!policy.is_blocked(MembershipTier::Diamond, room));
        }
    }
}
