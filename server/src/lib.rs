//! RH Manager HTTP surface: configuration, access gate, pages and handlers.

pub mod config;
pub mod gate;
pub mod http;
pub mod pages;
pub mod users;
