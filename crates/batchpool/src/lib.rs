#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod batch;
mod chunk;
mod error;
mod pool;
mod task;

pub use crate::batch::*;
pub use crate::chunk::*;
pub use crate::error::*;
pub use crate::pool::*;
pub use crate::task::*;
