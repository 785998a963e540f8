//! Delivery Hub - real-time connection hub for the order-delivery platform.
//!
//! Admits authenticated WebSocket connections, tracks which user owns which
//! live connection, and routes frames between users (direct chat and
//! broadcast location updates). The CRUD surface of the platform lives in a
//! separate service; this crate is only the hub and its collaborator seams.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
