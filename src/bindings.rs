pub mod card;
pub mod clipboard;
pub mod config;
pub mod qr;
