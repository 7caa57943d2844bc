pub mod filename;
pub mod storage;
