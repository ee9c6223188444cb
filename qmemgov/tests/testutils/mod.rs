//! Test utilities for qmemgov integration tests
//!
//! - NodeFixture: a governor started from a settings file, restartable with
//!   new limits the way a node is redeployed
//! - InMemoryConfigStore: a stand-in for the cluster configuration store that
//!   pushes changes to registered listeners

#![allow(dead_code)]

pub mod config_store;
pub mod node_fixture;
