pub mod courses;
pub mod health;
pub mod navigation;
pub mod runs;
