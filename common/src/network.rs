pub mod host;
pub mod interface;
pub mod packet;
pub mod range;
pub mod target;
