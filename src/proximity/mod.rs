pub mod model;
pub mod simulator;

pub use model::ProximityModel;
pub use simulator::ProximitySimulator;
