pub mod auto_advance;
pub mod restaurant_service;
