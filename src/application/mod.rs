pub mod activities;
pub mod orchestration;
pub mod ports;
pub mod services;
