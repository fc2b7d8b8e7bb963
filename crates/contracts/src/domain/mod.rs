pub mod a001_return_request;
pub mod a002_order;
pub mod a003_product;
pub mod a004_customer;
