//! Error types for the wagering engine
//!
//! Four families matter to callers: validation failures (nothing was drawn or
//! debited), store failures (the ledger operation did not happen), invariant
//! violations (a generator or ledger bug, never corrected silently) and
//! configuration errors raised while loading rules.

use crate::common::types::Money;

/// Root error type for all engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Rejected requests. Raised before any random draw or ledger call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Bet {bet} is below the minimum of {min}")]
    BetBelowMinimum { bet: Money, min: Money },

    #[error("Bet {bet} exceeds the maximum of {max}")]
    BetAboveMaximum { bet: Money, max: Money },

    #[error("Amount must be a finite, non-negative number: {0}")]
    InvalidAmount(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Round {0} not found or already settled")]
    UnknownRound(String),

    #[error("Round {round_id} belongs to another game ({expected})")]
    WrongRoundKind { round_id: String, expected: &'static str },

    #[error("Action not allowed: {0}")]
    ActionNotAllowed(String),
}

/// Ledger-level failures other than insufficient funds (which is a normal outcome)
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Wallet for {subject} could not be loaded: {reason}")]
    WalletUnavailable { subject: String, reason: String },

    #[error("Persisting wallet for {subject} failed: {reason}")]
    PersistFailed { subject: String, reason: String },
}

/// Backing store errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database open failed: {0}")]
    DatabaseOpenFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Conditions that indicate a bug in a generator or the ledger
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Negative credit amount: {0}")]
    NegativeCredit(String),

    #[error("Duplicate value {value} drawn in a without-replacement draw of {context}")]
    DuplicateDraw { context: &'static str, value: u32 },

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Random draw out of range: {0}")]
    DrawOutOfRange(String),

    #[error("Deck exhausted after {0} cards")]
    DeckExhausted(usize),
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue { field: String, value: String, reason: String },

    #[error("Invalid weighted table {table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

// External error conversions
impl From<rocksdb::Error> for EngineError {
    fn from(e: rocksdb::Error) -> Self {
        EngineError::Storage(StorageError::WriteFailed(e.to_string()))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Storage(StorageError::ReadFailed(e.to_string()))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Storage(StorageError::CorruptedData(e.to_string()))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl EngineError {
    /// True for errors raised before the ledger or the random source was touched
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    /// True for errors that point at a bug rather than bad input or I/O
    pub fn is_invariant(&self) -> bool {
        matches!(self, EngineError::Invariant(_))
    }
}

// Convenience type alias for Results
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err: EngineError = ValidationError::InvalidParameter {
            field: "target",
            reason: "must be between 0.01 and 98".to_string(),
        }
        .into();

        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_bet_bound_details() {
        let err = ValidationError::BetBelowMinimum {
            bet: Money::from_cents(5),
            min: Money::from_cents(10),
        };

        assert!(err.to_string().contains("0.05"));
        assert!(err.to_string().contains("0.10"));
    }

    #[test]
    fn test_error_classification() {
        let invariant: EngineError = InvariantViolation::DuplicateDraw {
            context: "keno",
            value: 7,
        }
        .into();
        assert!(invariant.is_invariant());
        assert!(!invariant.is_validation());

        let storage: EngineError = StorageError::WriteFailed("disk full".to_string()).into();
        assert!(!storage.is_invariant());
    }

    #[test]
    fn test_error_source() {
        let err: EngineError = ConfigurationError::ValidationFailed("test".to_string()).into();
        assert!(err.source().is_some());
    }
}
