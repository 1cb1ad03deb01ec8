pub mod apply;
pub mod diff;
