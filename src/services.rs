pub mod auth;
pub mod lead_service;
pub mod notification_service;
pub mod order_service;
pub mod otp_service;
pub mod pricing;
pub mod subscription_service;
