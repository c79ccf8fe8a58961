use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// PUMA codes of the study areas, in output row order.
    pub study_areas: Vec<i64>,
}

impl Default for Config {
    fn default() -> Self {
        // The seven Greater Boston study-area PUMAs of the homesharing project.
        Config {
            study_areas: vec![3301, 3303, 3302, 3305, 3304, 506, 507],
        }
    }
}
