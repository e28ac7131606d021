// Domain layer - City metrics model and scenario logic
pub mod scenario;
pub mod snapshot;
pub mod zone;
