pub mod error;
pub mod fetcher;
pub mod memory;
pub mod page;
pub mod result;

pub use error::ScanError;
pub use fetcher::{Delay, Fetcher, HostMode, HostPolicy, HttpFetcher, RetryPolicy};
pub use memory::MemoryFetcher;
pub use page::{Crumb, PageMeta};
pub use result::Document;
