//! Decoding helpers shared by the volume, directory and file layers

pub mod datetime;
pub mod path;
pub mod string;
