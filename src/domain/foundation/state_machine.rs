//! State machine trait for status enums.
//!
//! Gives order and transaction statuses one way to validate transitions.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for TransactionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Pending, Completed) | (Pending, Failed))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Pending => vec![Completed, Failed],
///             Completed | Failed => vec![],
///         }
///     }
/// }
///
/// let next = TransactionStatus::Pending.transition_to(TransactionStatus::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Attempt {
        Created,
        Submitted,
        Settled,
        Voided,
    }

    impl StateMachine for Attempt {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Attempt::*;
            matches!(
                (self, target),
                (Created, Submitted) | (Submitted, Settled) | (Submitted, Voided)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Attempt::*;
            match self {
                Created => vec![Submitted],
                Submitted => vec![Settled, Voided],
                Settled | Voided => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(
            Attempt::Created.transition_to(Attempt::Submitted),
            Ok(Attempt::Submitted)
        );
    }

    #[test]
    fn transition_to_fails_for_skipped_state() {
        assert!(Attempt::Created.transition_to(Attempt::Settled).is_err());
    }

    #[test]
    fn sinks_are_terminal() {
        assert!(Attempt::Settled.is_terminal());
        assert!(Attempt::Voided.is_terminal());
        assert!(!Attempt::Submitted.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for status in [
            Attempt::Created,
            Attempt::Submitted,
            Attempt::Settled,
            Attempt::Voided,
        ] {
            for target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }
}
