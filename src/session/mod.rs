pub mod flash;
pub mod store;
