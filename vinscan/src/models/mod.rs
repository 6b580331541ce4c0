mod ocr;
mod vehicle;

pub use ocr::*;
pub use vehicle::*;
