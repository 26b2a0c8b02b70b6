//! Per-subscriber delivery results.

use super::subscriber::SubscriberId;

/// Result of one delivery attempt to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Message accepted by the messaging platform.
    Delivered,
    /// Transient failure (rate limit, network, timeout); subscriber is kept.
    SoftFailure {
        /// Human-readable failure reason.
        reason: String,
    },
    /// Recipient is gone (blocked the bot, deleted, invalid id); subscriber is removed.
    PermanentFailure {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl DeliveryOutcome {
    /// True when the message was delivered.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// True when the subscriber should be dropped from the store.
    #[must_use]
    pub const fn is_permanent_failure(&self) -> bool {
        matches!(self, Self::PermanentFailure { .. })
    }
}

/// Outcomes for every subscriber targeted by a single broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    outcomes: Vec<(SubscriberId, DeliveryOutcome)>,
}

impl BroadcastReport {
    /// Build a report from collected outcomes.
    #[must_use]
    pub fn new(outcomes: Vec<(SubscriberId, DeliveryOutcome)>) -> Self {
        Self { outcomes }
    }

    /// All outcomes, one per targeted subscriber.
    #[must_use]
    pub fn outcomes(&self) -> &[(SubscriberId, DeliveryOutcome)] {
        &self.outcomes
    }

    /// Outcome for a specific subscriber, if it was targeted.
    #[must_use]
    pub fn outcome_for(&self, subscriber: SubscriberId) -> Option<&DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == subscriber)
            .map(|(_, outcome)| outcome)
    }

    /// Subscribers whose delivery failed permanently.
    #[must_use]
    pub fn permanent_failures(&self) -> Vec<SubscriberId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_permanent_failure())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of subscribers targeted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when nobody was targeted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of successful deliveries.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_delivered()).count()
    }

    /// Number of soft failures.
    #[must_use]
    pub fn soft_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DeliveryOutcome::SoftFailure { .. }))
            .count()
    }
}
