pub mod refund;
pub mod repository;
