//! Clients for the bookkeeping API

pub mod splitwise;

pub use splitwise::SplitwiseClient;
