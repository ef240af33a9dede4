pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod complaint_service;
pub mod courier_service;
pub mod order_service;
pub mod pos_service;
pub mod product_service;
pub mod report_service;
