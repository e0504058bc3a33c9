pub mod gateway;
pub mod message_store;
pub mod session_store;
pub mod storage;
