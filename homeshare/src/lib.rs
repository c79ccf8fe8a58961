use std::path::Path;

use anyhow::Result;
use log::debug;
use polars::frame::DataFrame;
use tabulate::Grouping;

use crate::config::Config;

// Re-exports
pub use column_names as COL;

// Modules
pub mod column_names;
pub mod config;
pub mod error;
pub mod estimate;
pub mod formatters;
pub mod microdata;
pub mod subsets;
pub mod tabulate;

/// Type for the loaded homesharing supply data and API
pub struct Homeshare {
    pub households: DataFrame,
    pub areas: DataFrame,
    pub config: Config,
}

impl Homeshare {
    /// Load the household microdata and geography lookup with default
    /// configuration.
    pub fn new<P: AsRef<Path>>(households: P, areas: P) -> Result<Self> {
        Self::new_with_config(households, areas, Config::default())
    }

    /// Load the household microdata and geography lookup with custom
    /// configuration.
    pub fn new_with_config<P: AsRef<Path>>(
        households: P,
        areas: P,
        config: Config,
    ) -> Result<Self> {
        debug!("config: {config:?}");
        let households = microdata::load_households(households)?;
        let areas = microdata::load_areas(areas)?;
        Ok(Self {
            households,
            areas,
            config,
        })
    }

    /// Compute the six supply tables for the configured study areas.
    pub fn tabulate(&self) -> Result<Vec<(Grouping, DataFrame)>> {
        Ok(tabulate::tabulate(
            &self.households,
            &self.areas,
            &self.config.study_areas,
        )?)
    }

    /// The configured study areas with their display names, in row order.
    pub fn study_areas(&self) -> Result<Vec<(i64, String)>> {
        self.config
            .study_areas
            .iter()
            .map(|&code| Ok((code, microdata::area_name(&self.areas, code)?)))
            .collect()
    }
}
