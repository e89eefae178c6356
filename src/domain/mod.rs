pub mod booking;
pub mod money;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod room;
