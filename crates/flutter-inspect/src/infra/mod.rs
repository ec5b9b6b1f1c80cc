pub mod config;
pub mod discovery;
pub mod signal_handler;
pub mod vm_service;
