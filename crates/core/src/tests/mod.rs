//! Shared test harnesses for storage implementations

pub mod storage;
