pub mod catalog;
pub mod config;
pub mod order_form;
pub mod orders;
pub mod report;
