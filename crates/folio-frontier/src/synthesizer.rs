//! 프런티어 합성기.
//!
//! 앵커(외부 엔진이 이미 최적이라고 판정한 포트폴리오)를 기준으로
//! 수익률-변동성 평면을 시각적으로 채우는 합성 포인트 군집을
//! 생성합니다. 합성 포인트는 앵커를 지배하는 것처럼 보이면 안 되므로
//! 생성 후 강등 패스를 거칩니다.
//!
//! 난수원은 호출자가 주입합니다. 프로덕션에서는 시드 없는
//! `thread_rng`를, 테스트에서는 고정 시드 `StdRng`를 사용합니다.

use rand::Rng;
use tracing::{debug, instrument};

use folio_core::{
    CandidatePortfolio, Composition, FolioResult, FrontierPayload, PortfolioSource,
};

use crate::anchors::{AnchorSet, Benchmarks, ObservedRange};
use crate::config::SynthesisConfig;
use crate::strategies::{generate_point, RawPoint};

/// 한 번의 합성 실행 결과.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// 수락된 후보 포트폴리오 (시뮬레이션 시드 + 합성)
    pub population: Vec<CandidatePortfolio>,
    /// 전체 생성 시도 횟수
    pub attempts: usize,
    /// 합성으로 수락된 포인트 수
    pub synthesized: usize,
    /// 원시 시뮬레이션에서 시드된 포인트 수
    pub seeded_from_simulations: usize,
}

/// 합성 포인트 군집 생성기.
#[derive(Debug, Clone, Default)]
pub struct FrontierSynthesizer {
    config: SynthesisConfig,
}

impl FrontierSynthesizer {
    /// 설정으로 합성기를 생성합니다.
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// 현재 설정.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// 합성 군집을 생성합니다.
    ///
    /// 1. 구성비가 "완전 투자"인 시뮬레이션 포인트를 목표 수까지 시드
    /// 2. 앵커가 하나라도 있으면 진행률 의존 전략으로 부족분을 합성
    /// 3. 각 포인트에 강등 패스와 클램프 적용
    /// 4. 구성비 합이 (99.5, 100.5)에 들어야만 수락
    ///
    /// 시도 횟수가 `target × max_attempts_factor`에 이르면 목표에
    /// 못 미쳐도 종료합니다. 앵커와 시드가 모두 없으면 빈 군집을
    /// 반환합니다 (에러 아님).
    #[instrument(skip(self, payload, rng), fields(target = self.config.target_population))]
    pub fn synthesize<R: Rng>(
        &self,
        payload: &FrontierPayload,
        rng: &mut R,
    ) -> FolioResult<SynthesisOutcome> {
        self.config.validate()?;

        let target = self.config.target_population;
        let risk_free = self
            .config
            .risk_free_rate_pct
            .unwrap_or_else(|| payload.risk_free_rate_pct());

        let anchors = AnchorSet::from_payload(payload);
        let range = ObservedRange::from_simulations(&payload.simulated);
        let benchmarks = Benchmarks::compute(&anchors, &range, risk_free);

        // 구성비를 갖춘 시뮬레이션 포인트로 군집을 시드
        let mut population: Vec<CandidatePortfolio> = payload
            .simulated
            .iter()
            .filter_map(|s| {
                let comp = s.normalized_composition()?;
                if !comp.is_fully_invested() {
                    return None;
                }
                Some(CandidatePortfolio {
                    annual_return_pct: s.annual_return_pct(),
                    annual_volatility_pct: s.volatility_pct(),
                    sharpe_ratio: s.sharpe_ratio(risk_free),
                    max_drawdown_pct: None,
                    composition: Some(comp),
                    source: PortfolioSource::Simulated,
                })
            })
            .take(target)
            .collect();
        let seeded_from_simulations = population.len();

        let mut attempts = 0;
        let mut synthesized = 0;

        if !anchors.is_empty() {
            let max_attempts = target * self.config.max_attempts_factor;
            while population.len() < target && attempts < max_attempts {
                attempts += 1;
                let progress = population.len() as f64 / target.max(1) as f64;

                let mut point = generate_point(
                    anchors.as_slice(),
                    &range,
                    progress,
                    self.config.bad_point_probability,
                    rng,
                );

                self.enforce_suboptimality(&mut point, &benchmarks, &range, risk_free, rng);

                let comp = match Composition::from_accumulated(&point.weights) {
                    Some(c) if c.is_fully_invested() => c,
                    _ => continue,
                };

                let sharpe = if point.volatility_pct != 0.0 {
                    (point.return_pct - risk_free) / point.volatility_pct
                } else {
                    0.0
                };
                population.push(CandidatePortfolio {
                    annual_return_pct: point.return_pct,
                    annual_volatility_pct: point.volatility_pct,
                    sharpe_ratio: sharpe,
                    max_drawdown_pct: None,
                    composition: Some(comp),
                    source: PortfolioSource::Synthetic,
                });
                synthesized += 1;
            }
        }

        debug!(
            accepted = population.len(),
            attempts, synthesized, seeded_from_simulations, "합성 완료"
        );

        Ok(SynthesisOutcome {
            population,
            attempts,
            synthesized,
            seeded_from_simulations,
        })
    }

    /// 강등 패스: 포인트가 앵커 품질을 넘지 않도록 조정합니다.
    ///
    /// - 샤프가 기준의 95%를 넘으면 60% 확률로 변동성을 1.2~1.7배
    ///   올리고, 아니면 수익률을 70~90%로 내립니다.
    /// - 수익률이 최대 수익률 기준의 98%를 넘으면 기준의 80~95%로
    ///   캡합니다.
    /// - 변동성이 최소 변동성 기준의 105% 미만이면 기준의 1.1~1.5배로
    ///   올립니다.
    /// - 마지막으로 변동성 [관측최소, 관측최대×2], 수익률
    ///   [현실 하한, 관측최대×1.5]로 클램프합니다.
    ///
    /// 현실 하한은 `max(1.0, 관측 최소 수익률 × 0.5)`입니다.
    fn enforce_suboptimality<R: Rng>(
        &self,
        point: &mut RawPoint,
        benchmarks: &Benchmarks,
        range: &ObservedRange,
        risk_free_rate_pct: f64,
        rng: &mut R,
    ) {
        let floor = (range.min_return_pct * 0.5).max(1.0);

        let sharpe = if point.volatility_pct > 0.0 {
            (point.return_pct - risk_free_rate_pct) / point.volatility_pct
        } else {
            0.0
        };
        if sharpe > benchmarks.max_sharpe * 0.95 {
            if rng.gen::<f64>() < 0.6 {
                point.volatility_pct *= 1.2 + rng.gen::<f64>() * 0.5;
            } else {
                point.return_pct = (point.return_pct * (0.7 + rng.gen::<f64>() * 0.2)).max(floor);
            }
        }

        if point.return_pct > benchmarks.max_return_pct * 0.98 {
            point.return_pct =
                (benchmarks.max_return_pct * (0.8 + rng.gen::<f64>() * 0.15)).max(floor);
        }

        if point.volatility_pct < benchmarks.min_volatility_pct * 1.05 {
            point.volatility_pct = benchmarks.min_volatility_pct * (1.1 + rng.gen::<f64>() * 0.4);
        }

        point.volatility_pct = point
            .volatility_pct
            .clamp(range.min_volatility_pct, range.max_volatility_pct * 2.0);
        point.return_pct = point.return_pct.clamp(floor, range.max_return_pct * 1.5);
    }
}
