//! Feature value types.
//!
//! A feature schema declares one of four scalar dtypes; every stored and
//! cached value is tagged with the dtype it was written as so the serving
//! path never has to guess.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared scalar type of a registered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Float64,
    Int64,
    String,
    Bool,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::Float64 => "float64",
            DType::Int64 => "int64",
            DType::String => "string",
            DType::Bool => "bool",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DType {
    type Err = UnknownDType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float64" => Ok(DType::Float64),
            "int64" => Ok(DType::Int64),
            "string" => Ok(DType::String),
            "bool" => Ok(DType::Bool),
            other => Err(UnknownDType(other.to_string())),
        }
    }
}

/// Returned when a dtype string does not match one of the four known tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature dtype '{0}'")]
pub struct UnknownDType(pub String);

/// A concrete feature value, tagged with its dtype.
///
/// `Null` is a valid value distinct from "missing" — a feature can be
/// explicitly recorded as absent for an entity at a point in time, which is
/// different from there being no record at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FeatureValueData {
    Float64(f64),
    Int64(i64),
    String(String),
    Bool(bool),
    Null,
}

impl FeatureValueData {
    /// The dtype this value was tagged with, if any (`Null` has none).
    pub fn dtype(&self) -> Option<DType> {
        match self {
            FeatureValueData::Float64(_) => Some(DType::Float64),
            FeatureValueData::Int64(_) => Some(DType::Int64),
            FeatureValueData::String(_) => Some(DType::String),
            FeatureValueData::Bool(_) => Some(DType::Bool),
            FeatureValueData::Null => None,
        }
    }

    /// Whether this value matches the declared schema dtype (`Null` matches
    /// any dtype).
    pub fn matches(&self, declared: DType) -> bool {
        match self.dtype() {
            Some(actual) => actual == declared,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_dtype() -> impl Strategy<Value = DType> {
        prop_oneof![
            Just(DType::Float64),
            Just(DType::Int64),
            Just(DType::String),
            Just(DType::Bool),
        ]
    }

    fn arb_tagged_value() -> impl Strategy<Value = (DType, FeatureValueData)> {
        prop_oneof![
            any::<f64>().prop_map(|v| (DType::Float64, FeatureValueData::Float64(v))),
            any::<i64>().prop_map(|v| (DType::Int64, FeatureValueData::Int64(v))),
            any::<String>().prop_map(|v| (DType::String, FeatureValueData::String(v))),
            any::<bool>().prop_map(|v| (DType::Bool, FeatureValueData::Bool(v))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any DType D, D.to_string().parse::<DType>() SHALL equal D.
        #[test]
        fn dtype_display_parse_round_trips(dtype in arb_dtype()) {
            let parsed: DType = dtype.to_string().parse().unwrap();
            prop_assert_eq!(parsed, dtype);
        }

        /// For any dtype D and any value V generated for D, V.matches(D) SHALL hold,
        /// and V.matches(other) SHALL be false for every other dtype.
        #[test]
        fn value_matches_only_its_own_dtype((dtype, value) in arb_tagged_value()) {
            prop_assert!(value.matches(dtype));
            for other in [DType::Float64, DType::Int64, DType::String, DType::Bool] {
                if other != dtype {
                    prop_assert!(!value.matches(other));
                }
            }
        }
    }

    #[test]
    fn dtype_round_trips_through_display_and_parse() {
        for dtype in [DType::Float64, DType::Int64, DType::String, DType::Bool] {
            let parsed: DType = dtype.to_string().parse().unwrap();
            assert_eq!(parsed, dtype);
        }
    }

    #[test]
    fn unknown_dtype_rejected() {
        assert!("decimal".parse::<DType>().is_err());
    }

    #[test]
    fn null_matches_any_declared_dtype() {
        assert!(FeatureValueData::Null.matches(DType::Bool));
        assert!(FeatureValueData::Null.matches(DType::String));
    }

    #[test]
    fn typed_value_only_matches_its_own_dtype() {
        let v = FeatureValueData::Int64(7);
        assert!(v.matches(DType::Int64));
        assert!(!v.matches(DType::Float64));
    }
}
