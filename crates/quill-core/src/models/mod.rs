//! Data models for the image pipeline

mod image;

pub use image::*;
