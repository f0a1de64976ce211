mod expand;
mod shorten;

pub use expand::expand_handler;
pub use shorten::shorten_handler;
