mod stats;
mod ticket;
mod ticket_message;
