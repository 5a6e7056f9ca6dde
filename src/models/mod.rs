pub mod booking;
pub mod customer;
pub mod master;
pub mod order;
pub mod service;
pub mod user;

pub use booking::{BookingSession, BookingStage, ValidationError};
pub use customer::{Customer, NewCustomer};
pub use master::{Master, NewMaster};
pub use order::{slot_is_free, NewOrder, Order, OrderStatistics, OrderStatus};
pub use service::{NewService, Service};
pub use user::User;
