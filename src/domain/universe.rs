//! Instrument universe: the tickers a scan covers, grouped by asset class.
//!
//! The built-in lists follow the supplier's ticker conventions (`=X` for
//! forex pairs, `=F` for futures, `^` for indices). A config file may replace
//! any class with its own comma-separated list.

use crate::domain::error::ScanError;
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;
use std::fmt;

pub const FOREX_PAIRS: &[&str] = &[
    "EURUSD=X", "GBPUSD=X", "USDJPY=X", "USDCHF=X", "AUDUSD=X", "NZDUSD=X", "USDCAD=X",
    "EURGBP=X", "EURJPY=X", "EURCHF=X", "EURAUD=X", "EURNZD=X", "EURCAD=X", "GBPJPY=X",
    "GBPCHF=X", "GBPAUD=X", "GBPNZD=X", "GBPCAD=X", "AUDJPY=X", "AUDNZD=X", "AUDCAD=X",
    "AUDCHF=X", "NZDJPY=X", "NZDCAD=X", "NZDCHF=X", "CADJPY=X", "CADCHF=X", "CHFJPY=X",
];

/// Gold, silver, WTI, Brent, natural gas, copper, platinum, palladium.
pub const COMMODITIES: &[&str] = &["GC=F", "SI=F", "CL=F", "BZ=F", "NG=F", "HG=F", "PL=F", "PA=F"];

/// S&P 500, Dow, Nasdaq, FTSE 100, DAX, CAC 40, Nikkei 225, Hang Seng,
/// Euro Stoxx 50, ASX 200.
pub const INDICES: &[&str] = &[
    "^GSPC", "^DJI", "^IXIC", "^FTSE", "^GDAXI", "^FCHI", "^N225", "^HSI", "^STOXX50E", "^AXJO",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Forex,
    Commodity,
    Index,
}

impl AssetClass {
    pub fn all() -> &'static [AssetClass] {
        &[AssetClass::Forex, AssetClass::Commodity, AssetClass::Index]
    }

    /// Key under `[universe]` in the config file.
    pub fn config_key(&self) -> &'static str {
        match self {
            AssetClass::Forex => "forex",
            AssetClass::Commodity => "commodities",
            AssetClass::Index => "indices",
        }
    }

    pub fn defaults(&self) -> &'static [&'static str] {
        match self {
            AssetClass::Forex => FOREX_PAIRS,
            AssetClass::Commodity => COMMODITIES,
            AssetClass::Index => INDICES,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.config_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub ticker: String,
    pub class: AssetClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("universe is empty")]
    Empty,
}

impl Universe {
    pub fn builtin() -> Self {
        let instruments = AssetClass::all()
            .iter()
            .flat_map(|class| {
                class.defaults().iter().map(move |t| Instrument {
                    ticker: (*t).to_string(),
                    class: *class,
                })
            })
            .collect();
        Self { instruments }
    }

    /// Built-in lists, with any class present under `[universe]` replaced.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScanError> {
        let mut instruments = Vec::new();
        let mut seen = HashSet::new();

        for class in AssetClass::all() {
            let tickers = match config.get_string("universe", class.config_key()) {
                Some(list) if list.trim().is_empty() => Vec::new(),
                Some(list) => parse_codes(&list)?,
                None => class.defaults().iter().map(|t| t.to_string()).collect(),
            };
            for ticker in tickers {
                if !seen.insert(ticker.clone()) {
                    return Err(UniverseError::DuplicateCode(ticker).into());
                }
                instruments.push(Instrument {
                    ticker,
                    class: *class,
                });
            }
        }

        if instruments.is_empty() {
            return Err(UniverseError::Empty.into());
        }
        Ok(Self { instruments })
    }

    pub fn count(&self) -> usize {
        self.instruments.len()
    }

    pub fn tickers(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.ticker.clone()).collect()
    }

    pub fn of_class(&self, class: AssetClass) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(move |i| i.class == class)
    }
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn builtin_universe_sizes() {
        let universe = Universe::builtin();
        assert_eq!(universe.count(), 28 + 8 + 10);
        assert_eq!(universe.of_class(AssetClass::Forex).count(), 28);
        assert_eq!(universe.of_class(AssetClass::Commodity).count(), 8);
        assert_eq!(universe.of_class(AssetClass::Index).count(), 10);
        assert_eq!(universe.instruments[0].ticker, "EURUSD=X");
        assert_eq!(universe.instruments[28].ticker, "GC=F");
        assert_eq!(universe.instruments[36].ticker, "^GSPC");
    }

    #[test]
    fn builtin_tickers_are_unique() {
        let tickers = Universe::builtin().tickers();
        let unique: HashSet<_> = tickers.iter().collect();
        assert_eq!(unique.len(), tickers.len());
    }

    #[test]
    fn test_parse_codes_basic() {
        let result = parse_codes("EURUSD=X,GC=F,^GSPC").unwrap();
        assert_eq!(result, vec!["EURUSD=X", "GC=F", "^GSPC"]);
    }

    #[test]
    fn test_parse_codes_trims_and_uppercases() {
        let result = parse_codes("  eurusd=x , gc=f ").unwrap();
        assert_eq!(result, vec!["EURUSD=X", "GC=F"]);
    }

    #[test]
    fn test_parse_codes_empty_token() {
        let result = parse_codes("GC=F,,SI=F");
        assert!(matches!(result, Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn test_parse_codes_duplicate() {
        let result = parse_codes("GC=F,SI=F,GC=F");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "GC=F"));
    }

    #[test]
    fn config_overrides_one_class() {
        let config =
            FileConfigAdapter::from_string("[universe]\nforex = EURUSD=X,GBPUSD=X\n").unwrap();
        let universe = Universe::from_config(&config).unwrap();
        assert_eq!(universe.of_class(AssetClass::Forex).count(), 2);
        assert_eq!(universe.of_class(AssetClass::Commodity).count(), 8);
        assert_eq!(universe.count(), 2 + 8 + 10);
    }

    #[test]
    fn blank_class_is_disabled() {
        let config = FileConfigAdapter::from_string(
            "[universe]\nforex = EURUSD=X\ncommodities =\nindices =\n",
        )
        .unwrap();
        let universe = Universe::from_config(&config).unwrap();
        assert_eq!(universe.tickers(), vec!["EURUSD=X"]);
    }

    #[test]
    fn all_classes_blank_is_an_error() {
        let config = FileConfigAdapter::from_string(
            "[universe]\nforex =\ncommodities =\nindices =\n",
        )
        .unwrap();
        let err = Universe::from_config(&config).unwrap_err();
        assert!(matches!(err, ScanError::Universe(UniverseError::Empty)));
    }

    #[test]
    fn duplicate_across_classes_is_an_error() {
        let config = FileConfigAdapter::from_string(
            "[universe]\nforex = GC=F\ncommodities = GC=F\nindices = ^GSPC\n",
        )
        .unwrap();
        assert!(Universe::from_config(&config).is_err());
    }
}
