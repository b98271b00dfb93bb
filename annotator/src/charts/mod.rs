pub mod annotate;
pub mod constants;
pub mod image;
pub mod labels;
pub mod mapper;
pub mod markers;
pub mod png;
