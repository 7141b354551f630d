pub mod packing;
pub mod product;
pub mod search;
