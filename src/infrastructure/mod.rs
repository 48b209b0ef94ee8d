//! Infrastructure layer - columnar storage and output rendering

pub mod rendering;
pub mod storage;
