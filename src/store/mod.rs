mod cache;
mod remap;

pub use cache::{CacheEvent, CacheStore, FetchTicket};
pub use remap::{EmailRef, RemapLog, Resolution};
