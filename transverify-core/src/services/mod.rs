pub mod clipboard;
pub mod encoding;
pub mod export;
pub mod navigation;
pub mod pairing;
pub mod persistence;
pub mod qa;
pub mod session;
pub mod store;
