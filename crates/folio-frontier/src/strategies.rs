//! 진행률 의존 포인트 생성 전략.
//!
//! 세 전략은 서로 독립적인 순수 함수이며, 진행률(목표 대비 생성
//! 비율)에 따라 디스패처가 하나를 고릅니다:
//!
//! - 처음 30%: 앵커 혼합 (최적점 주변)
//! - 다음 30%: 중심 분산 (범위 가운데)
//! - 마지막 40%: 광역/극단 (지배당하는 영역 포함)
//!
//! 난수원은 항상 호출자가 주입합니다.

use rand::Rng;
use std::collections::BTreeMap;

use crate::anchors::{Anchor, ObservedRange};

/// 혼합 전략이 적용되는 진행률 상한.
pub const MIXTURE_PHASE_END: f64 = 0.3;

/// 중심 분산 전략이 적용되는 진행률 상한.
pub const DISPERSION_PHASE_END: f64 = 0.6;

/// 혼합 전략의 좌표 지터 표준편차 (범위 폭 대비 비율).
pub const MIXTURE_JITTER_SIGMA: f64 = 0.05;

/// 중심 분산 전략의 표준편차 (범위 폭 대비 비율).
pub const DISPERSION_SIGMA: f64 = 0.3;

/// 강등/클램프 전에 만들어진 원시 합성 포인트.
///
/// 구성비는 아직 정규화되지 않은 누적 퍼센트 맵입니다.
#[derive(Debug, Clone)]
pub struct RawPoint {
    /// 연환산 변동성 (%)
    pub volatility_pct: f64,
    /// 연환산 수익률 (%)
    pub return_pct: f64,
    /// 누적 구성비 (티커 → 누적 퍼센트, 정규화 전)
    pub weights: BTreeMap<String, f64>,
}

/// 표준정규 난수 (Box-Muller 변환).
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let mut u = 0.0f64;
    let mut v = 0.0f64;
    while u == 0.0 {
        u = rng.gen::<f64>();
    }
    while v == 0.0 {
        v = rng.gen::<f64>();
    }
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// 진행률에 따라 전략을 골라 포인트를 생성합니다.
///
/// `bad_point_probability`는 극단 전략에서만 사용됩니다.
pub fn generate_point<R: Rng>(
    anchors: &[Anchor],
    range: &ObservedRange,
    progress: f64,
    bad_point_probability: f64,
    rng: &mut R,
) -> RawPoint {
    if progress < MIXTURE_PHASE_END {
        mixture_point(anchors, range, rng)
    } else if progress < DISPERSION_PHASE_END {
        dispersion_point(anchors, range, rng)
    } else {
        extreme_point(anchors, range, bad_point_probability, rng)
    }
}

/// 혼합 전략: 앵커 2~3개의 볼록 결합.
///
/// 좌표와 구성비를 같은 랜덤 가중치로 섞고, 범위 폭의 5%를
/// 표준편차로 하는 가우시안 지터를 좌표에 더합니다.
pub fn mixture_point<R: Rng>(anchors: &[Anchor], range: &ObservedRange, rng: &mut R) -> RawPoint {
    let take = anchors.len().min(if rng.gen::<f64>() < 0.35 { 2 } else { 3 });

    let mut indices: Vec<usize> = Vec::with_capacity(take);
    while indices.len() < take {
        let idx = rng.gen_range(0..anchors.len());
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }

    let mut mix_weights: Vec<f64> = indices.iter().map(|_| rng.gen::<f64>()).collect();
    let sum: f64 = mix_weights.iter().sum();
    let sum = if sum > 0.0 { sum } else { 1.0 };
    for w in &mut mix_weights {
        *w /= sum;
    }

    let mut volatility_pct = 0.0;
    let mut return_pct = 0.0;
    let mut weights: BTreeMap<String, f64> = BTreeMap::new();

    for (&idx, &w) in indices.iter().zip(&mix_weights) {
        let anchor = &anchors[idx];
        volatility_pct += anchor.volatility_pct * w;
        return_pct += anchor.return_pct * w;

        if let Some(comp) = &anchor.composition {
            for (ticker, pct) in comp.iter() {
                *weights.entry(ticker.clone()).or_insert(0.0) += pct * w;
            }
        }
    }

    volatility_pct += gaussian(rng) * MIXTURE_JITTER_SIGMA * range.volatility_span();
    return_pct += gaussian(rng) * MIXTURE_JITTER_SIGMA * range.return_span();

    RawPoint {
        volatility_pct,
        return_pct,
        weights,
    }
}

/// 중심 분산 전략: 범위 중심의 가우시안.
///
/// 구성비는 임의 앵커 하나에서 가져오되, 항목마다 0.8~1.2배의
/// 랜덤 스케일을 곱합니다 (이 단계에서는 재정규화하지 않음).
pub fn dispersion_point<R: Rng>(
    anchors: &[Anchor],
    range: &ObservedRange,
    rng: &mut R,
) -> RawPoint {
    let volatility_pct =
        range.volatility_center() + gaussian(rng) * DISPERSION_SIGMA * range.volatility_span();
    let return_pct =
        range.return_center() + gaussian(rng) * DISPERSION_SIGMA * range.return_span();

    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    if !anchors.is_empty() {
        let anchor = &anchors[rng.gen_range(0..anchors.len())];
        if let Some(comp) = &anchor.composition {
            for (ticker, pct) in comp.iter() {
                let scale = 0.8 + rng.gen::<f64>() * 0.4;
                weights.insert(ticker.clone(), pct * scale);
            }
        }
    }

    RawPoint {
        volatility_pct,
        return_pct,
        weights,
    }
}

/// 광역/극단 전략: 확장 범위의 균등 샘플.
///
/// 수익률 하한은 `max(1.0, 관측 최소 수익률 × 0.8)`이며,
/// `bad_point_probability` 확률로 고변동성/저수익의 의도적으로
/// 나쁜 포인트를 만듭니다. 구성비는 앵커 2~4개에서 항목별 랜덤
/// 배율로 누적합니다.
pub fn extreme_point<R: Rng>(
    anchors: &[Anchor],
    range: &ObservedRange,
    bad_point_probability: f64,
    rng: &mut R,
) -> RawPoint {
    let mut volatility_pct =
        range.min_volatility_pct + rng.gen::<f64>() * range.volatility_span() * 1.5;
    let floor = (range.min_return_pct * 0.8).max(1.0);
    let mut return_pct = floor + rng.gen::<f64>() * (range.max_return_pct * 1.2 - floor);

    if rng.gen::<f64>() < bad_point_probability {
        volatility_pct = range.max_volatility_pct * (1.2 + rng.gen::<f64>() * 0.8);
        return_pct = floor + rng.gen::<f64>() * (range.max_return_pct * 0.4 - floor);
    }

    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    if !anchors.is_empty() {
        let take = anchors.len().min(2 + rng.gen_range(0..3));
        let mut indices: Vec<usize> = Vec::with_capacity(take);
        while indices.len() < take {
            let idx = rng.gen_range(0..anchors.len());
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        for idx in indices {
            if let Some(comp) = &anchors[idx].composition {
                for (ticker, pct) in comp.iter() {
                    *weights.entry(ticker.clone()).or_insert(0.0) += pct * rng.gen::<f64>();
                }
            }
        }
    }

    RawPoint {
        volatility_pct,
        return_pct,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{AnchorKind, FrontierPayload};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn anchors() -> Vec<Anchor> {
        let payload: FrontierPayload = serde_json::from_str(
            r#"{"max_sharpe_portfolio": {"Volatility": 10.0, "Return": 8.0,
                                          "weights": {"VWCE": 70, "AGGH": 30}},
                "min_volatility_portfolio": {"Volatility": 6.0, "Return": 4.0,
                                              "weights": {"VWCE": 30, "AGGH": 70}},
                "max_return_portfolio": {"Volatility": 16.0, "Return": 12.0,
                                          "weights": {"VWCE": 100}}}"#,
        )
        .unwrap();
        crate::anchors::AnchorSet::from_payload(&payload)
            .as_slice()
            .to_vec()
    }

    fn range() -> ObservedRange {
        ObservedRange {
            min_volatility_pct: 0.0,
            max_volatility_pct: 16.0,
            min_return_pct: 0.0,
            max_return_pct: 12.0,
        }
    }

    #[test]
    fn test_gaussian_is_roughly_standard() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f64> = (0..10_000).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
            / (samples.len() - 1) as f64;

        assert!(mean.abs() < 0.05, "평균 {}", mean);
        assert!((var - 1.0).abs() < 0.1, "분산 {}", var);
    }

    #[test]
    fn test_mixture_point_stays_near_anchor_hull() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let p = mixture_point(&anchors, &range, &mut rng);
            // 볼록 결합 ± 지터(σ=5%) 범위
            assert!(p.volatility_pct > 6.0 - 5.0 && p.volatility_pct < 16.0 + 5.0);
            assert!(p.return_pct > 4.0 - 4.0 && p.return_pct < 12.0 + 4.0);
            assert!(!p.weights.is_empty());
        }
    }

    #[test]
    fn test_mixture_weights_accumulate_all_tickers() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(1);

        let p = mixture_point(&anchors, &range, &mut rng);
        let sum: f64 = p.weights.values().sum();
        // 앵커 구성비는 합 100이므로 볼록 결합의 누적 합도 100 근처
        assert!((sum - 100.0).abs() < 1.0, "누적 합 {}", sum);
    }

    #[test]
    fn test_dispersion_point_composition_scale() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let p = dispersion_point(&anchors, &range, &mut rng);
            // 단일 앵커 구성비 × [0.8, 1.2] → 합은 [80, 120] 구간
            let sum: f64 = p.weights.values().sum();
            assert!(sum > 79.9 && sum < 120.1, "합 {}", sum);
        }
    }

    #[test]
    fn test_extreme_point_return_floor() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..500 {
            let p = extreme_point(&anchors, &range, 0.2, &mut rng);
            // 하한 max(1.0, 0×0.8) = 1.0
            assert!(p.return_pct >= 1.0 - 1e-9, "수익률 {}", p.return_pct);
            assert!(p.volatility_pct >= 0.0);
        }
    }

    #[test]
    fn test_extreme_point_bad_points_have_high_volatility() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(11);

        // 확률 1.0 → 모든 포인트가 나쁜 포인트
        for _ in 0..100 {
            let p = extreme_point(&anchors, &range, 1.0, &mut rng);
            assert!(p.volatility_pct >= range.max_volatility_pct * 1.2 - 1e-9);
        }
    }

    #[test]
    fn test_dispatcher_phase_selection() {
        let anchors = anchors();
        let range = range();
        let mut rng = StdRng::seed_from_u64(5);

        // 마지막 40% 구간은 극단 전략 → 수익률 하한 1.0 보장
        for _ in 0..100 {
            let p = generate_point(&anchors, &range, 0.9, 0.0, &mut rng);
            assert!(p.return_pct >= 1.0 - 1e-9);
        }
    }

    #[test]
    fn test_anchor_kinds_preserved() {
        let anchors = anchors();
        assert_eq!(anchors[0].kind, AnchorKind::MaxSharpe);
        assert_eq!(anchors.len(), 3);
    }
}
