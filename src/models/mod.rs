pub mod contact;
pub mod engagement;
pub mod order;
pub mod product;
pub mod social;
pub mod user;
