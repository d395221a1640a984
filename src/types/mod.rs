pub mod course;
pub mod geo;
pub mod navigation;
pub mod run;
