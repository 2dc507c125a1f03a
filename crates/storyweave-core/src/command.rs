//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every player-issued command.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name, used in logs.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried into every event the command produces.
    fn correlation_id(&self) -> Uuid;

    /// The player issuing the command.
    fn user_id(&self) -> Uuid;
}
