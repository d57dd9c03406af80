// Adapters layer: concrete implementations of the domain ports and the
// request gateway that sits in front of the core.

pub mod gateway;
pub mod memory;
