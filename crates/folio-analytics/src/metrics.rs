//! 포트폴리오 성과 지표.
//!
//! 자산별 일별 가치 시계열과 가중치 벡터에서 연환산 수익률,
//! 변동성, 샤프 지수, 최대 낙폭을 계산합니다.
//!
//! 날짜 기준은 첫 번째 자산의 시계열 길이입니다. 다른 자산에
//! 해당 날짜 데이터가 없으면 그 날의 기여는 0으로 처리합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use folio_core::{EquityPoint, FolioResult, WeightVector};

/// 연환산 기준 거래일 수.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 기본 무위험 수익률 (%).
pub const DEFAULT_RISK_FREE_RATE_PCT: f64 = 2.0;

/// 단일 자산의 일별 가치 시계열.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSeries {
    /// 티커
    pub ticker: String,
    /// 일별 가치 포인트 (날짜 오름차순)
    pub daily: Vec<EquityPoint>,
}

impl AssetSeries {
    pub fn new(ticker: impl Into<String>, daily: Vec<EquityPoint>) -> Self {
        Self {
            ticker: ticker.into(),
            daily,
        }
    }
}

/// 포트폴리오 성과 요약.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// 연환산 수익률 (%)
    pub annual_return_pct: f64,
    /// 연환산 변동성 (%)
    pub annual_volatility_pct: f64,
    /// 샤프 지수
    pub sharpe_ratio: f64,
    /// 최대 낙폭 (%, 음수)
    pub max_drawdown_pct: f64,
}

impl PortfolioPerformance {
    /// 모든 지표가 0인 요약 (데이터 없음).
    pub fn zero() -> Self {
        Self {
            annual_return_pct: 0.0,
            annual_volatility_pct: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown_pct: 0.0,
        }
    }
}

/// 가격 시계열을 일별 단순 수익률로 변환.
///
/// 직전 가격이 0 이하인 날은 건너뜁니다.
pub fn prices_to_returns(prices: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(prices.len().saturating_sub(1));
    for w in prices.windows(2) {
        if w[0] > 0.0 {
            returns.push(w[1] / w[0] - 1.0);
        }
    }
    returns
}

/// Decimal 가격을 수익률로 변환.
pub fn prices_to_returns_decimal(prices: &[Decimal]) -> Vec<f64> {
    let prices_f64: Vec<f64> = prices.iter().filter_map(|d| d.to_f64()).collect();
    prices_to_returns(&prices_f64)
}

/// 가중 포트폴리오의 일별 수익률 시퀀스.
///
/// 날짜 인덱스 기준은 첫 번째 자산입니다. 각 날짜 `t`에 대해
/// `Σ weight(ticker) × (v[t] / v[t-1] - 1)`을 계산하되, 해당 자산에
/// `t`와 `t-1` 데이터가 모두 있고 직전 가치가 양수인 경우에만
/// 기여를 더합니다.
pub fn portfolio_daily_returns(assets: &[AssetSeries], weights: &WeightVector) -> Vec<f64> {
    let num_days = match assets.first() {
        Some(first) => first.daily.len(),
        None => return Vec::new(),
    };
    if num_days < 2 {
        return Vec::new();
    }

    let mut returns = Vec::with_capacity(num_days - 1);
    for t in 1..num_days {
        let mut day_return = 0.0;
        for asset in assets {
            let weight = weights.weight(&asset.ticker);
            if weight == 0.0 {
                continue;
            }
            if let (Some(prev), Some(curr)) = (asset.daily.get(t - 1), asset.daily.get(t)) {
                if prev.value > 0.0 {
                    day_return += weight * (curr.value / prev.value - 1.0);
                }
            }
        }
        returns.push(day_return);
    }
    returns
}

/// 포트폴리오 성과 지표를 계산합니다.
///
/// 가중치 벡터는 분수(합 1.0) 기준이며 먼저 검증됩니다. 자산이
/// 없거나 수익률을 만들 수 없으면 모든 지표가 0인 요약을
/// 반환합니다 (에러 아님).
#[instrument(skip(assets, weights), fields(assets = assets.len()))]
pub fn calculate_portfolio_performance(
    assets: &[AssetSeries],
    weights: &WeightVector,
    risk_free_rate_pct: f64,
) -> FolioResult<PortfolioPerformance> {
    weights.validate()?;

    let returns = portfolio_daily_returns(assets, weights);
    if returns.is_empty() {
        debug!("수익률 시퀀스 없음, 0 지표 반환");
        return Ok(PortfolioPerformance::zero());
    }

    let annual_return_pct = annual_return(&returns);
    let annual_volatility_pct = annual_volatility(&returns);
    let sharpe_ratio = if annual_volatility_pct == 0.0 {
        0.0
    } else {
        (annual_return_pct - risk_free_rate_pct) / annual_volatility_pct
    };
    let max_drawdown_pct = max_drawdown_from_returns(&returns);

    Ok(PortfolioPerformance {
        annual_return_pct,
        annual_volatility_pct,
        sharpe_ratio,
        max_drawdown_pct,
    })
}

/// 연환산 수익률 (%): `(Π(1+r))^(252/n) - 1`.
fn annual_return(returns: &[f64]) -> f64 {
    let total: f64 = returns.iter().map(|r| 1.0 + r).product();
    if total <= 0.0 {
        return -100.0;
    }
    (total.powf(TRADING_DAYS_PER_YEAR / returns.len() as f64) - 1.0) * 100.0
}

/// 연환산 변동성 (%): 표본 표준편차 × √252.
fn annual_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

/// 누적곱 곡선 기준 최대 낙폭 (%).
fn max_drawdown_from_returns(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = (cumulative / peak - 1.0) * 100.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series(ticker: &str, values: &[f64]) -> AssetSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AssetSeries::new(
            ticker,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| EquityPoint::new(start + chrono::Duration::days(i as i64), *v))
                .collect(),
        )
    }

    #[test]
    fn test_prices_to_returns() {
        let returns = prices_to_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-9);
        assert!((returns[1] - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_prices_to_returns_decimal() {
        let returns = prices_to_returns_decimal(&[dec!(100), dec!(105)]);
        assert_eq!(returns.len(), 1);
        assert!((returns[0] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_portfolio_daily_returns_two_assets() {
        let assets = vec![
            series("AAA", &[100.0, 110.0, 110.0]),
            series("BBB", &[50.0, 50.0, 55.0]),
        ];
        let weights =
            WeightVector::from_fractions([("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]);
        let returns = portfolio_daily_returns(&assets, &weights);

        assert_eq!(returns.len(), 2);
        // 1일차: 0.5×10% + 0.5×0% = 5%
        assert!((returns[0] - 0.05).abs() < 1e-9);
        // 2일차: 0.5×0% + 0.5×10% = 5%
        assert!((returns[1] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_missing_data_contributes_zero() {
        // 두 번째 자산은 시계열이 짧음
        let assets = vec![
            series("AAA", &[100.0, 110.0, 121.0]),
            series("BBB", &[50.0, 55.0]),
        ];
        let weights =
            WeightVector::from_fractions([("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]);
        let returns = portfolio_daily_returns(&assets, &weights);

        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-9);
        // 2일차: BBB 데이터 없음 → AAA 기여만
        assert!((returns[1] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_performance_empty_assets() {
        let weights = WeightVector::from_fractions([("AAA".to_string(), 1.0)]);
        let perf = calculate_portfolio_performance(&[], &weights, 2.0).unwrap();
        assert_eq!(perf, PortfolioPerformance::zero());
    }

    #[test]
    fn test_performance_invalid_weights() {
        let weights = WeightVector::from_fractions([("AAA".to_string(), 0.5)]);
        let assets = vec![series("AAA", &[100.0, 110.0])];
        assert!(calculate_portfolio_performance(&assets, &weights, 2.0).is_err());
    }

    #[test]
    fn test_zero_volatility_sharpe() {
        // 매일 동일 가치 → 변동성 0, 샤프 0
        let assets = vec![series("AAA", &[100.0, 100.0, 100.0, 100.0])];
        let weights = WeightVector::from_fractions([("AAA".to_string(), 1.0)]);
        let perf = calculate_portfolio_performance(&assets, &weights, 2.0).unwrap();

        assert_eq!(perf.annual_volatility_pct, 0.0);
        assert_eq!(perf.sharpe_ratio, 0.0);
        assert_eq!(perf.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_annualized_return_constant_growth() {
        // 매일 +1% × 4일 → (1.01)^252 - 1
        let assets = vec![series("AAA", &[100.0, 101.0, 102.01, 103.0301, 104.060401])];
        let weights = WeightVector::from_fractions([("AAA".to_string(), 1.0)]);
        let perf = calculate_portfolio_performance(&assets, &weights, 2.0).unwrap();

        let expected = (1.01f64.powf(252.0) - 1.0) * 100.0;
        assert!((perf.annual_return_pct - expected).abs() < 1e-6);
    }

    #[test]
    fn test_max_drawdown_from_curve() {
        // 10% 상승 후 20% 하락
        let assets = vec![series("AAA", &[100.0, 110.0, 88.0])];
        let weights = WeightVector::from_fractions([("AAA".to_string(), 1.0)]);
        let perf = calculate_portfolio_performance(&assets, &weights, 2.0).unwrap();

        assert!((perf.max_drawdown_pct - (-20.0)).abs() < 1e-9);
    }
}
