pub mod conversation;
pub mod query;
pub mod report;
pub mod translation;
