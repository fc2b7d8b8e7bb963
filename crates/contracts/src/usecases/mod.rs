pub mod common;
pub mod u201_process_return;
