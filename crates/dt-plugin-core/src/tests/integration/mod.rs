#![cfg(test)]

pub mod common;
pub mod lifecycle_tests;
pub mod magic_link_tests;
pub mod routing_tests;
pub mod settings_tests;
