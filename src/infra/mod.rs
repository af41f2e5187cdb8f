pub mod compose;
pub mod interpolate;
pub mod observer;
pub mod units;
pub mod web;
