// Domain layer: records, lookup outcomes and the ports the pipelines talk through.

pub mod model;
pub mod ports;
pub mod range;
