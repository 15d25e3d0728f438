pub mod cart;
pub mod chat;
pub mod coaching;
pub mod contact;
pub mod errors;
pub mod notification;
pub mod order;
pub mod page;
pub mod payment;
pub mod podcast;
pub mod ports;
pub mod product;
pub mod review;
pub mod role;
pub mod social;
pub mod sport;
pub mod user;
