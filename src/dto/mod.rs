pub mod auth;
pub mod cart;
pub mod categories;
pub mod complaints;
pub mod couriers;
pub mod orders;
pub mod pos;
pub mod products;
pub mod reports;
