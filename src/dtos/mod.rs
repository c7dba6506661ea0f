pub mod material;
pub mod product;
pub mod user;
