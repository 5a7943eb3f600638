//! Web access: cached fetches, HTML extraction, search scraping, page
//! analysis and downloads.

pub mod cache;
pub mod client;
pub mod download;
mod error;
pub mod html;
pub mod page;
pub mod render;
pub mod search;
mod tool;


pub use cache::WebCache;
pub use client::{FetchedPage, WebClient, normalize_url};
pub use download::{DownloadRequest, DownloadResult};
pub use error::{WebError, WebResult};
pub use page::{PageAnalysis, SeoReport};
pub use search::{SearchEngine, SearchHit};
pub use tool::{FetchReport, FetchRequest, SearchReport, WebTool};
