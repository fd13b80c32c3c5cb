//! Client side of the clip upload

mod client;

pub use client::{clip_file_name, ClipUploader, HttpUploader, UploadReceipt, UploadRequest};
