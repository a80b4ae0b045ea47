//! vdmove Core - Domain logic for moving a personal disk into a virtual disk
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `ResourceDescriptor`, `ResourceKind`, `PathPrefix`
//! - **Use cases** - `TransferTreeUseCase`
//! - **Port definitions** - `IDiskProvider`, implemented by the REST adapter
//! - **Configuration** - YAML file plus environment overrides
//!
//! # Architecture
//!
//! The domain module holds pure path and descriptor logic with no I/O.
//! Ports define the trait interface that the `vdmove-api` adapter implements.
//! Use cases orchestrate domain types through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
