// Domain layer: records, report entries and the ports the core talks through.

pub mod model;
pub mod ports;
