//! Application layer: the hub coordinator and routing policy.

pub mod hub;
