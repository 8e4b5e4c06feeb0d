#![allow(clippy::useless_format, clippy::too_many_arguments)]

pub mod shared;
pub mod system;
pub mod usecases;
