pub mod check;
pub mod hosts;
pub mod import;
