// Domain layer: address models and the ports the classifier talks through.

pub mod model;
pub mod ports;
