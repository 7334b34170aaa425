pub mod prelude;

pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_message;
pub mod ticket_question;
