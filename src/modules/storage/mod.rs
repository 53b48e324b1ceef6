//! S3-compatible object storage for rendered report PDFs and photo
//! evidence.

mod s3_client;

pub use s3_client::StorageClient;
