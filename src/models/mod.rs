pub mod account;
pub mod catalog;
pub mod form;
pub mod response;
