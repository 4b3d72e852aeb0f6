pub mod banner;
pub mod lane;
pub mod signing;
