pub mod u201_process_return;
