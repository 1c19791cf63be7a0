//! Mining module for block assembly and transaction pooling

pub mod assembler;
pub mod mempool;

pub use assembler::{subsidy_at, AssemblyStats, BlockAssembler, RejectedTransaction};
pub use mempool::Mempool;
