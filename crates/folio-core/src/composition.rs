//! 포트폴리오 구성비(composition) 정규화.
//!
//! 외부 최적화 서비스는 구성비를 여러 형태로 보냅니다:
//! - `{ticker, weight}` 쌍의 배열 (키 이름도 `weight`/`weight_percent`/
//!   `pct`/`percent`/`value`로 제각각)
//! - 티커 → 숫자 맵
//! - 값은 분수(0.65)일 수도, 퍼센트(65)일 수도 있음
//!
//! 이 모듈은 모든 형태를 단 하나의 정규화 단계로 흡수하여,
//! 다른 로직이 실행되기 전에 항상 "합이 100인 퍼센트 맵" 하나로
//! 만듭니다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{FolioError, FolioResult};

/// "완전 투자"로 인정되는 구성비 합의 하한 (%).
pub const FULLY_INVESTED_MIN_PCT: f64 = 99.5;

/// "완전 투자"로 인정되는 구성비 합의 상한 (%).
pub const FULLY_INVESTED_MAX_PCT: f64 = 100.5;

/// 분수 가중치 벡터의 합 허용 오차.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// 구성비 한 항목의 원시 형태.
///
/// 티커와 가중치 키 이름이 소스마다 다르므로 alias로 전부 수용합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeightEntry {
    /// 종목 티커
    #[serde(alias = "symbol")]
    pub ticker: Option<String>,
    /// 가중치 (분수 또는 퍼센트)
    #[serde(
        alias = "weight_percent",
        alias = "pct",
        alias = "percent",
        alias = "value"
    )]
    pub weight: Option<f64>,
}

/// 외부에서 도착하는 구성비의 원시 형태 (태그 없는 유니온).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawComposition {
    /// `[{ticker, weight}, ...]` 형태
    Pairs(Vec<RawWeightEntry>),
    /// `{ "AAPL": 65, ... }` 형태
    Map(HashMap<String, f64>),
}

/// 정규화된 구성비: 티커 → 퍼센트, 합계 ≈ 100.
///
/// 정규화 단계를 거치지 않고는 생성할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition(BTreeMap<String, f64>);

impl Composition {
    /// 원시 구성비를 정규화합니다.
    ///
    /// 값이 1보다 크면 이미 퍼센트, 1 이하이면 분수로 간주하여 100을
    /// 곱합니다. 유효 합이 0 이하이면 구성비 없음으로 처리합니다.
    ///
    /// # 반환
    ///
    /// 합이 정확히 100으로 재조정된 구성비. 사용할 수 있는 항목이
    /// 없으면 None.
    pub fn from_raw(raw: &RawComposition) -> Option<Self> {
        let mut pct: BTreeMap<String, f64> = BTreeMap::new();

        match raw {
            RawComposition::Pairs(entries) => {
                for entry in entries {
                    let ticker = match &entry.ticker {
                        Some(t) if !t.is_empty() => t.clone(),
                        _ => continue,
                    };
                    let w = match entry.weight {
                        Some(w) if w.is_finite() => w,
                        _ => continue,
                    };
                    *pct.entry(ticker).or_insert(0.0) += as_percent(w);
                }
            }
            RawComposition::Map(map) => {
                for (ticker, w) in map {
                    if !w.is_finite() {
                        continue;
                    }
                    *pct.entry(ticker.clone()).or_insert(0.0) += as_percent(*w);
                }
            }
        }

        Self::from_accumulated(&pct)
    }

    /// 누적 퍼센트 맵을 합 100으로 재조정합니다.
    ///
    /// 프런티어 합성기가 앵커 구성비를 누적한 중간 맵에도 그대로
    /// 사용됩니다. 각 항목은 소수점 6자리로 반올림합니다.
    pub fn from_accumulated(pct: &BTreeMap<String, f64>) -> Option<Self> {
        if pct.is_empty() {
            return None;
        }

        let sum: f64 = pct.values().sum();
        if !(sum > 0.0) {
            return None;
        }

        let normalized = pct
            .iter()
            .map(|(t, v)| (t.clone(), round6(v / sum * 100.0)))
            .collect();

        Some(Self(normalized))
    }

    /// 구성비 퍼센트의 합계.
    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }

    /// "완전 투자" 여부: 합이 (99.5, 100.5) 구간에 있는지 확인합니다.
    pub fn is_fully_invested(&self) -> bool {
        let sum = self.sum();
        sum > FULLY_INVESTED_MIN_PCT && sum < FULLY_INVESTED_MAX_PCT
    }

    /// 특정 티커의 퍼센트를 반환합니다.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.0.get(ticker).copied()
    }

    /// (티커, 퍼센트) 반복자.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// 항목 수.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 구성비가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 분수 가중치 벡터로 변환합니다 (퍼센트 ÷ 100).
    pub fn to_weight_vector(&self) -> WeightVector {
        WeightVector(
            self.0
                .iter()
                .map(|(t, pct)| (t.clone(), pct / 100.0))
                .collect(),
        )
    }
}

/// 분수 가중치 벡터: 티커 → [0,1] 가중치, 합계 1 ± 1e-6.
///
/// 지표 계산에 투입되기 전 [`WeightVector::validate`]를 통과해야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(BTreeMap<String, f64>);

impl WeightVector {
    /// 분수 항목들에서 가중치 벡터를 생성합니다.
    pub fn from_fractions<I: IntoIterator<Item = (String, f64)>>(fractions: I) -> Self {
        Self(fractions.into_iter().collect())
    }

    /// 가중치 합이 1 ± 1e-6인지 검증합니다.
    pub fn validate(&self) -> FolioResult<()> {
        let sum: f64 = self.0.values().sum();
        if !sum.is_finite() {
            return Err(FolioError::InvalidInput(
                "가중치에 비유한 값 포함".to_string(),
            ));
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FolioError::InvalidInput(format!(
                "가중치 합이 1이 아님: {}",
                sum
            )));
        }
        Ok(())
    }

    /// 특정 티커의 가중치 (없으면 0).
    pub fn weight(&self, ticker: &str) -> f64 {
        self.0.get(ticker).copied().unwrap_or(0.0)
    }

    /// (티커, 가중치) 반복자.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// 항목 수.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 가중치 벡터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 값이 1보다 크면 퍼센트 그대로, 아니면 분수로 보고 100을 곱합니다.
fn as_percent(w: f64) -> f64 {
    if w > 1.0 {
        w
    } else {
        w * 100.0
    }
}

/// 소수점 6자리 반올림.
fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_raw_pairs_fractions() {
        let raw: RawComposition =
            serde_json::from_str(r#"[{"ticker":"AAPL","weight":0.6},{"ticker":"MSFT","weight":0.4}]"#)
                .unwrap();
        let comp = Composition::from_raw(&raw).unwrap();

        assert!((comp.get("AAPL").unwrap() - 60.0).abs() < 1e-9);
        assert!((comp.get("MSFT").unwrap() - 40.0).abs() < 1e-9);
        assert!(comp.is_fully_invested());
    }

    #[test]
    fn test_from_raw_pairs_alternate_keys() {
        // symbol / weight_percent 키도 동일하게 수용
        let raw: RawComposition = serde_json::from_str(
            r#"[{"symbol":"VWCE","weight_percent":70},{"symbol":"AGGH","pct":30}]"#,
        )
        .unwrap();
        let comp = Composition::from_raw(&raw).unwrap();

        assert!((comp.get("VWCE").unwrap() - 70.0).abs() < 1e-9);
        assert!((comp.get("AGGH").unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_raw_map_percent() {
        let raw: RawComposition =
            serde_json::from_str(r#"{"AAPL": 65, "MSFT": 35}"#).unwrap();
        let comp = Composition::from_raw(&raw).unwrap();

        assert!((comp.sum() - 100.0).abs() < 1e-6);
        assert!(comp.is_fully_invested());
    }

    #[test]
    fn test_from_raw_rescales_to_100() {
        // 합이 100이 아니면 100으로 재조정
        let raw: RawComposition = serde_json::from_str(r#"{"A": 50, "B": 30}"#).unwrap();
        let comp = Composition::from_raw(&raw).unwrap();

        assert!((comp.sum() - 100.0).abs() < 1e-6);
        assert!((comp.get("A").unwrap() - 62.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_raw_empty_or_zero() {
        let raw: RawComposition = serde_json::from_str(r#"{}"#).unwrap();
        assert!(Composition::from_raw(&raw).is_none());

        let raw: RawComposition = serde_json::from_str(r#"{"A": 0.0}"#).unwrap();
        assert!(Composition::from_raw(&raw).is_none());
    }

    #[test]
    fn test_missing_ticker_skipped() {
        let raw: RawComposition =
            serde_json::from_str(r#"[{"weight":0.5},{"ticker":"B","weight":0.5}]"#).unwrap();
        let comp = Composition::from_raw(&raw).unwrap();

        assert_eq!(comp.len(), 1);
        assert!((comp.get("B").unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_vector_validate() {
        let comp = Composition::from_raw(
            &serde_json::from_str::<RawComposition>(r#"{"A": 60, "B": 40}"#).unwrap(),
        )
        .unwrap();
        let weights = comp.to_weight_vector();

        assert!(weights.validate().is_ok());
        assert!((weights.weight("A") - 0.6).abs() < 1e-9);
        assert!((weights.weight("없는티커") - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_vector_validate_rejects_bad_sum() {
        let weights =
            WeightVector::from_fractions([("A".to_string(), 0.6), ("B".to_string(), 0.5)]);
        assert!(weights.validate().is_err());
    }

    proptest! {
        // 정규화된 구성비는 언제나 합이 100에 (반올림 오차 내로) 수렴
        #[test]
        fn prop_normalized_sums_to_100(values in proptest::collection::btree_map(
            "[A-Z]{2,5}", 0.01f64..1000.0, 1..8
        )) {
            let pct: BTreeMap<String, f64> = values;
            let comp = Composition::from_accumulated(&pct).unwrap();
            prop_assert!((comp.sum() - 100.0).abs() < 1e-4);
            prop_assert!(comp.is_fully_invested());
        }
    }
}
