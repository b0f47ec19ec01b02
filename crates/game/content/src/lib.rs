//! Read-only encounter content and its loaders.
//!
//! This crate provides the stats collaborator consumed by `encounter-core`:
//! - Weapon profiles, per-character loadouts and enemy templates
//!   ([`ContentCatalog`], data-driven via RON)
//! - Engine tunables ([`encounter_core::CombatConfig`], data-driven via TOML)
//!
//! Content is consumed through the `StatsOracle` trait and never appears in
//! encounter state beyond the profile ids combatants carry.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{ContentCatalog, Loadout};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogFile, CatalogLoader, ConfigLoader, ContentFactory};
