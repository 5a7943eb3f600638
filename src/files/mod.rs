//! File operations: read, write, copy, move, delete, listings, search and
//! inspection, with an in-memory operation log.

mod error;
pub mod history;
pub mod inspect;
mod listing;
mod ops;
pub mod render;

#[cfg(test)]
mod listing_test;

pub use error::{FileError, FileResult};
pub use history::{HistoryView, OperationHistory};
pub use listing::{
    DirEntryInfo, DirectoryListing, ListOptions, SearchHit, SearchOptions, SearchResults, SortBy,
    list_directory, search_files,
};
pub use ops::{
    DeleteResult, FileContent, FileInfo, FileTool, ReadOptions, ReadResult, TransferResult,
    WriteOptions, WriteResult, backup_path_for, resolve_path,
};
