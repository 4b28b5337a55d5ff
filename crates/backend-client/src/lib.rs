//! Backend client library
//!
//! This crate talks to the backend data/storage service: the function-call
//! RPC protocol, the typed operations the app consumes, and the binary blob
//! transfer used for post images.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod retry;
pub mod rpc;
pub mod transfer;
pub mod types;

pub use backend::{BackendService, HttpBackend};
pub use rpc::{RpcClient, RpcClientConfig, RpcError, RpcRequest};
pub use transfer::{BlobUploader, HttpBlobUploader, TransferError, UploadResponse};
pub use types::{Author, FeedPost, NewPost, StorageId, UploadReceipt, UploadUrl};
