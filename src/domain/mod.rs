pub mod entity;
pub mod resolve;
pub mod tile;
