pub mod gallery;
pub mod showcase;
