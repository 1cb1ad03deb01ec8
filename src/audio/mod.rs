pub mod metadata;
pub mod transcode;
