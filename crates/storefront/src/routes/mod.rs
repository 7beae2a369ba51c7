//! HTTP Routes

pub mod health;
pub mod home;
pub mod orders;
pub mod products;
