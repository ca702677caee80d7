pub mod endpoint;
pub mod scope;
pub mod target;
pub mod unit;
