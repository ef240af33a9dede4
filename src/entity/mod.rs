pub mod cart_items;
pub mod categories;
pub mod complaints;
pub mod couriers;
pub mod order_items;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use complaints::Entity as Complaints;
pub use couriers::Entity as Couriers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payment_methods::Entity as PaymentMethods;
pub use products::Entity as Products;
pub use users::Entity as Users;
