pub mod catalog;
pub mod normalize;
pub mod resolver;

pub use resolver::ImageResolver;
