pub mod generator;
pub mod study;
