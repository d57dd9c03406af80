// Domain layer: models and ports. Nothing here depends on adapters.

pub mod model;
pub mod ports;
