pub mod bindings;
pub mod config;
pub mod console;
pub mod credential;
pub mod domain;
pub mod gate;
pub mod http;
pub mod usecase;
