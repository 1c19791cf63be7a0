//! Chain parameters
//!
//! Fixed at genesis and stored inside the ledger snapshot. The on-disk
//! `params.json` uses camelCase keys; value fields are whole coins and are
//! scaled by `decimals` into minor units.

use crate::core::amount::{coins_to_units, unit_scale, Amount, MAX_DECIMALS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Seconds in a (365-day) year, used by the halving schedule
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Default parameters file name
pub const PARAMS_FILE: &str = "params.json";

/// Parameter loading errors
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No parameters file found (looked in: {0})")]
    NotFound(String),
    #[error("Invalid parameters: {0}")]
    Invalid(String),
}

/// Immutable chain configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    /// Prefix of every account identifier
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub consensus: String,
    #[serde(rename = "targetBlockTimeSeconds")]
    pub target_block_time_secs: u64,
    /// Whole coins minted by the first block of each era before halving
    pub initial_subsidy: u64,
    /// Whole coins; zero disables the cap
    pub max_supply: u64,
    pub halving_years: u64,
    /// Whole coins credited at genesis
    #[serde(default)]
    pub premine: u64,
    pub decimals: u32,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            ticker: "BFC".to_string(),
            name: "BitFuture Coin".to_string(),
            consensus: "local".to_string(),
            target_block_time_secs: 600,
            initial_subsidy: 50,
            max_supply: 21_000_000,
            halving_years: 4,
            premine: 0,
            decimals: 8,
        }
    }
}

impl ChainParams {
    /// Load parameters from an explicit path, or from the first default
    /// location that exists: `./params.json`, `./bitfuture-coin/params.json`,
    /// then next to the executable.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ParamsError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let mut candidates = vec![
            PathBuf::from(PARAMS_FILE),
            Path::new("bitfuture-coin").join(PARAMS_FILE),
        ];
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(PARAMS_FILE));
            }
        }

        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => Err(ParamsError::NotFound(
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    /// Read and validate a parameters file
    pub fn from_file(path: &Path) -> Result<Self, ParamsError> {
        let data = fs::read_to_string(path)?;
        let params: ChainParams = serde_json::from_str(&data)?;
        params.validate()?;
        log::debug!("Loaded chain parameters from {}", path.display());
        Ok(params)
    }

    /// Reject parameter sets the ledger cannot run with
    pub fn validate(&self) -> Result<(), ParamsError> {
        let invalid = |msg: &str| Err(ParamsError::Invalid(msg.to_string()));

        if self.ticker.is_empty() {
            return invalid("ticker must not be empty");
        }
        if self.target_block_time_secs == 0 {
            return invalid("targetBlockTimeSeconds must be positive");
        }
        if self.halving_years == 0 {
            return invalid("halvingYears must be positive");
        }
        if self.decimals > MAX_DECIMALS {
            return invalid("decimals must be at most 18");
        }
        if self.blocks_per_halving() == 0 {
            return invalid("halving period is shorter than one block");
        }
        for coins in [self.initial_subsidy, self.max_supply, self.premine] {
            if coins_to_units(coins, self.decimals).is_err() {
                return invalid("value does not fit in minor units");
            }
        }
        if self.max_supply > 0 && self.premine > self.max_supply {
            return invalid("premine exceeds maxSupply");
        }
        Ok(())
    }

    /// `floor(secondsPerYear * halvingYears / targetBlockTime)`
    pub fn blocks_per_halving(&self) -> u64 {
        SECONDS_PER_YEAR.saturating_mul(self.halving_years) / self.target_block_time_secs.max(1)
    }

    /// Minor units per whole coin
    pub fn unit(&self) -> Amount {
        unit_scale(self.decimals)
    }

    pub fn initial_subsidy_units(&self) -> Amount {
        self.initial_subsidy.saturating_mul(self.unit())
    }

    /// Supply cap in minor units, `None` when uncapped
    pub fn max_supply_units(&self) -> Option<Amount> {
        (self.max_supply > 0).then(|| self.max_supply.saturating_mul(self.unit()))
    }

    pub fn premine_units(&self) -> Amount {
        self.premine.saturating_mul(self.unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let params = ChainParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.blocks_per_halving(), 210_240);
        assert_eq!(params.initial_subsidy_units(), 5_000_000_000);
        assert_eq!(params.max_supply_units(), Some(2_100_000_000_000_000));
    }

    #[test]
    fn test_parse_original_layout() {
        let json = r#"{
            "ticker": "BFC",
            "name": "BitFuture Coin",
            "consensus": "pow",
            "targetBlockTimeSeconds": 600,
            "initialSubsidy": 50,
            "maxSupply": 21000000,
            "halvingYears": 4,
            "premine": 0,
            "decimals": 8
        }"#;
        let params: ChainParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.target_block_time_secs, 600);
        assert_eq!(params.halving_years, 4);
        assert_eq!(params.consensus, "pow");
    }

    #[test]
    fn test_validation_rejects_bad_params() {
        let mut params = ChainParams::default();
        params.target_block_time_secs = 0;
        assert!(params.validate().is_err());

        let mut params = ChainParams::default();
        params.premine = params.max_supply + 1;
        assert!(params.validate().is_err());

        let mut params = ChainParams::default();
        params.decimals = 19;
        assert!(params.validate().is_err());

        let mut params = ChainParams::default();
        params.target_block_time_secs = SECONDS_PER_YEAR * 10;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, serde_json::to_string(&ChainParams::default()).unwrap()).unwrap();

        let loaded = ChainParams::load(Some(&path)).unwrap();
        assert_eq!(loaded, ChainParams::default());

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ChainParams::load(Some(&path)),
            Err(ParamsError::ParseError(_))
        ));
    }
}
