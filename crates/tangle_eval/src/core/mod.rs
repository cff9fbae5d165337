pub mod arena;
pub mod value;
