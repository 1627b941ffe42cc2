pub mod user_repo;
pub use user_repo::UserRepository;
pub mod otp_repo;
pub use otp_repo::OtpRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
