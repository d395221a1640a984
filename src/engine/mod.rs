pub mod geo;
pub mod navigation;
pub mod progress;
pub mod route;
pub mod session;
pub mod stages;
pub mod turns;
pub mod verify;
pub mod waypoints;
