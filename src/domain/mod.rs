//! Domain layer: dependency-free types shared by every other layer.

pub mod foundation;
pub mod messaging;
