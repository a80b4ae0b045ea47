//! Use cases (interactors) for vdmove
//!
//! Use cases are thin coordinators that delegate path logic to the domain
//! and I/O to ports.
//!
//! - [`TransferTreeUseCase`] - Recreate folders and move files into a virtual disk

pub mod transfer_tree;

pub use transfer_tree::{
    PlannedMove, TransferEvent, TransferPlan, TransferReport, TransferTreeUseCase,
};
