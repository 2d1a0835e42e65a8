// Domain layer: submission models and the ports the pipeline talks to.

pub mod model;
pub mod ports;
