pub mod ticket_queries;
