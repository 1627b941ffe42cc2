pub mod auth;
pub mod catalog;
pub mod crm;
pub mod notification;
pub mod sales;
