//! Settings read from the environment (and `.env`, loaded by the binary).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{GastosError, GastosResult};

pub const OUTPUT_DIR_VAR: &str = "GASTOS_OUTPUT_DIR";
pub const PER_DIEM_VAR: &str = "GASTOS_PER_DIEM";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub per_diem: Option<Decimal>,
}

impl Config {
    pub fn from_env() -> GastosResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> GastosResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let per_diem = match non_blank(PER_DIEM_VAR) {
            Some(raw) => Some(
                parse_amount(&raw).map_err(|e| GastosError::Config(format!("{PER_DIEM_VAR}: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            output_dir: non_blank(OUTPUT_DIR_VAR).map(|v| PathBuf::from(v.trim())),
            per_diem,
        })
    }
}

/// Parses a non-negative amount, accepting `,` as decimal separator ("20,50").
pub fn parse_amount(raw: &str) -> GastosResult<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| GastosError::InvalidAmount(raw.trim().to_string()))?;
    if amount.is_sign_negative() {
        return Err(GastosError::InvalidAmount(raw.trim().to_string()));
    }
    Ok(amount)
}

/// `~/Descargas` when it exists, otherwise the platform Downloads folder.
pub fn default_output_dir() -> Option<PathBuf> {
    let spanish = dirs::home_dir().map(|home| home.join("Descargas"));
    spanish
        .filter(|p| p.is_dir())
        .or_else(dirs::download_dir)
        .filter(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_amount_dot_and_comma() {
        assert_eq!(parse_amount("20.00").unwrap(), Decimal::new(2000, 2));
        assert_eq!(parse_amount(" 20,50 ").unwrap(), Decimal::new(2050, 2));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_rejects_garbage_and_negative() {
        assert!(matches!(parse_amount("veinte"), Err(GastosError::InvalidAmount(_))));
        assert!(matches!(parse_amount("-1"), Err(GastosError::InvalidAmount(_))));
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (OUTPUT_DIR_VAR, "/tmp/gastos"),
            (PER_DIEM_VAR, "12,5"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/gastos")));
        assert_eq!(config.per_diem, Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_config_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[(OUTPUT_DIR_VAR, "  "), (PER_DIEM_VAR, "")])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_invalid_per_diem() {
        let err = Config::from_lookup(lookup(&[(PER_DIEM_VAR, "abc")])).unwrap_err();
        assert!(matches!(err, GastosError::Config(_)));
    }
}
