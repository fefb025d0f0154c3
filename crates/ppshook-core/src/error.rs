// crates/ppshook-core/src/error.rs

use thiserror::Error;

use crate::publisher::PublishError;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("pps_hook must contain metadata attribute {0}")]
    MissingMandatoryField(&'static str),

    #[error("metadata is missing key 'filename'")]
    MissingFilename,

    #[error("cannot compute granule duration: {missing} is null")]
    InvalidDuration { missing: &'static str },

    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),
}

pub type Result<T> = std::result::Result<T, HookError>;
