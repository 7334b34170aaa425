use thiserror::Error;

/// Domain errors raised by the ticket lifecycle engine.
///
/// Every variant's `Display` text is user-facing: engine entry points send it
/// back to the acting user as-is. None of these indicate infrastructure
/// failure and none of them leave the ticket record changed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TicketError {
    /// Actor lacks the support role required for this action.
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    /// A guarded transition is already in flight for this ticket.
    #[error("Another operation is already in progress for this ticket, try again in a moment.")]
    AlreadyInProgress,

    /// Claim was requested on a ticket that already has a claimer.
    #[error("This ticket is already claimed by <@{0}>.")]
    AlreadyClaimed(String),

    /// Unclaim was requested by someone other than the current claimer.
    #[error("Only the current claimer can release this ticket.")]
    NotClaimer,

    /// No ticket maps to the given id or channel.
    #[error("No ticket was found for this channel.")]
    NotFound,

    /// The requested ticket type key is not in the catalog.
    #[error("Unknown ticket type: {0}")]
    UnknownType(String),

    /// The requested priority is not a configured level.
    #[error("Unknown priority level: {0}")]
    UnknownPriority(String),

    /// Priority was changed too recently.
    ///
    /// Carries the remaining wait in seconds so the user knows when to retry.
    #[error("Priority was changed recently, wait {0}s before changing it again.")]
    CooldownActive(i64),

    /// Transfer target equals the ticket's current type.
    #[error("The ticket already has this type.")]
    SameType,

    /// Close/delete was requested on a ticket already past the point of no return.
    #[error("This ticket is already being deleted.")]
    AlreadyDeleted,

    /// Reopen was requested on a ticket that is not closed.
    #[error("Only closed tickets can be reopened.")]
    NotClosed,

    /// Creator is on the blacklist.
    #[error("You are not allowed to open tickets on this server.")]
    Blacklisted,

    /// Creator does not hold any of the roles the type requires.
    #[error("You are missing the role required to open this kind of ticket.")]
    MissingRequiredRole,

    /// Creator is at the concurrent ticket cap.
    #[error("You already have {0} tickets, close one before opening another.")]
    MaxTicketsReached(u32),

    /// Creation attempted outside the configured working hours.
    #[error("Tickets can only be opened during support working hours.")]
    OutsideWorkingHours,
}
