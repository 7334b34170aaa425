pub use super::ticket::Entity as Ticket;
pub use super::ticket_attachment::Entity as TicketAttachment;
pub use super::ticket_message::Entity as TicketMessage;
pub use super::ticket_question::Entity as TicketQuestion;
