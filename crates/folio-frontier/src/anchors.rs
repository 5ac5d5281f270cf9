//! 앵커 포트폴리오와 합성 전 관측 범위.
//!
//! 앵커는 외부 최적화 엔진이 이미 최적이라고 판정한 기준점입니다.
//! 합성기는 앵커의 좌표와 구성비를 섞어 새 포인트를 만들고, 앵커의
//! 품질을 넘지 않도록 강등 기준(benchmark)을 세웁니다.

use folio_core::{
    AnchorKind, CandidatePortfolio, Composition, FrontierPayload, PortfolioSource,
    RawAnchorPortfolio, RawSimulatedPortfolio,
};

/// 관측 범위의 변동성 하한 (%). 항상 0 이하로 확장됩니다.
const RANGE_FLOOR: f64 = 0.0;

/// 관측 범위의 상한 최소값 (%). 항상 1 이상으로 확장됩니다.
const RANGE_CEILING_MIN: f64 = 1.0;

/// 정규화된 앵커 포트폴리오.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// 앵커 종류
    pub kind: AnchorKind,
    /// 연환산 변동성 (%)
    pub volatility_pct: f64,
    /// 연환산 수익률 (%)
    pub return_pct: f64,
    /// 외부 엔진이 보낸 샤프 비율 (없을 수 있음)
    pub sharpe: Option<f64>,
    /// 정규화된 구성비 (없을 수 있음)
    pub composition: Option<Composition>,
}

impl Anchor {
    fn from_raw(kind: AnchorKind, raw: &RawAnchorPortfolio) -> Self {
        Self {
            kind,
            volatility_pct: raw.volatility_pct(),
            return_pct: raw.annual_return_pct(),
            sharpe: raw.sharpe.filter(|s| s.is_finite()),
            composition: raw.normalized_composition(),
        }
    }

    /// 샤프 비율. 외부 값이 없으면 좌표에서 유도하고, 변동성이 0이면
    /// 0을 반환합니다.
    pub fn sharpe_ratio(&self, risk_free_rate_pct: f64) -> f64 {
        match self.sharpe {
            Some(s) => s,
            None if self.volatility_pct > 0.0 => {
                (self.return_pct - risk_free_rate_pct) / self.volatility_pct
            }
            None => 0.0,
        }
    }

    /// 산점도 렌더링용 후보 포트폴리오로 변환합니다.
    pub fn as_candidate(&self, risk_free_rate_pct: f64) -> CandidatePortfolio {
        CandidatePortfolio {
            annual_return_pct: self.return_pct,
            annual_volatility_pct: self.volatility_pct,
            sharpe_ratio: self.sharpe_ratio(risk_free_rate_pct),
            max_drawdown_pct: None,
            composition: self.composition.clone(),
            source: PortfolioSource::Anchor(self.kind),
        }
    }
}

/// 페이로드에 존재하는 앵커들의 모음 (0~4개).
#[derive(Debug, Clone, Default)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    /// 페이로드에서 존재하는 앵커만 수집합니다.
    pub fn from_payload(payload: &FrontierPayload) -> Self {
        let mut anchors = Vec::with_capacity(4);
        let named = [
            (AnchorKind::MaxSharpe, &payload.max_sharpe_portfolio),
            (AnchorKind::MinVolatility, &payload.min_volatility_portfolio),
            (AnchorKind::MaxReturn, &payload.max_return_portfolio),
            (AnchorKind::UserStatic, &payload.user_portfolio_point),
        ];
        for (kind, raw) in named {
            if let Some(raw) = raw {
                anchors.push(Anchor::from_raw(kind, raw));
            }
        }
        Self { anchors }
    }

    /// 특정 종류의 앵커.
    pub fn find(&self, kind: AnchorKind) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.kind == kind)
    }

    /// 앵커 슬라이스.
    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    /// 앵커 수.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// 앵커가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// 합성 전 관측 범위.
///
/// 시뮬레이션 포인트들의 좌표에서 계산하며, 순환 의존을 피하기 위해
/// 합성 결과는 절대 반영하지 않습니다. 최종 플롯 범위와는 별개입니다.
///
/// 빈 입력에서도 범위가 퇴화하지 않도록 변동성/수익률 모두
/// [0, 1] 이상으로 확장됩니다.
#[derive(Debug, Clone, Copy)]
pub struct ObservedRange {
    /// 최소 변동성 (%)
    pub min_volatility_pct: f64,
    /// 최대 변동성 (%)
    pub max_volatility_pct: f64,
    /// 최소 수익률 (%)
    pub min_return_pct: f64,
    /// 최대 수익률 (%)
    pub max_return_pct: f64,
}

impl ObservedRange {
    /// 시뮬레이션 포인트들에서 관측 범위를 계산합니다.
    pub fn from_simulations(simulated: &[RawSimulatedPortfolio]) -> Self {
        let mut range = Self {
            min_volatility_pct: RANGE_FLOOR,
            max_volatility_pct: RANGE_CEILING_MIN,
            min_return_pct: RANGE_FLOOR,
            max_return_pct: RANGE_CEILING_MIN,
        };
        for s in simulated {
            let vol = s.volatility_pct();
            let ret = s.annual_return_pct();
            range.min_volatility_pct = range.min_volatility_pct.min(vol);
            range.max_volatility_pct = range.max_volatility_pct.max(vol);
            range.min_return_pct = range.min_return_pct.min(ret);
            range.max_return_pct = range.max_return_pct.max(ret);
        }
        range
    }

    /// 변동성 범위 폭 (0 방지 하한 1e-6).
    pub fn volatility_span(&self) -> f64 {
        (self.max_volatility_pct - self.min_volatility_pct).max(1e-6)
    }

    /// 수익률 범위 폭 (0 방지 하한 1e-6).
    pub fn return_span(&self) -> f64 {
        (self.max_return_pct - self.min_return_pct).max(1e-6)
    }

    /// 변동성 범위 중심.
    pub fn volatility_center(&self) -> f64 {
        (self.max_volatility_pct + self.min_volatility_pct) / 2.0
    }

    /// 수익률 범위 중심.
    pub fn return_center(&self) -> f64 {
        (self.max_return_pct + self.min_return_pct) / 2.0
    }
}

/// 강등 기준: 합성 포인트가 넘지 말아야 할 앵커 품질.
///
/// 해당 앵커가 없으면 관측 범위에서 보수적인 대체값을 씁니다.
#[derive(Debug, Clone, Copy)]
pub struct Benchmarks {
    /// 최대 샤프 앵커의 샤프 비율
    pub max_sharpe: f64,
    /// 최대 수익률 앵커의 수익률 (%)
    pub max_return_pct: f64,
    /// 최소 변동성 앵커의 변동성 (%)
    pub min_volatility_pct: f64,
}

impl Benchmarks {
    /// 앵커와 관측 범위에서 강등 기준을 계산합니다.
    pub fn compute(anchors: &AnchorSet, range: &ObservedRange, risk_free_rate_pct: f64) -> Self {
        let max_sharpe = match anchors.find(AnchorKind::MaxSharpe) {
            Some(a) => (a.return_pct - risk_free_rate_pct) / a.volatility_pct.max(0.01),
            None => 2.0,
        };
        let max_return_pct = match anchors.find(AnchorKind::MaxReturn) {
            Some(a) => a.return_pct,
            None => range.max_return_pct * 0.8,
        };
        let min_volatility_pct = match anchors.find(AnchorKind::MinVolatility) {
            Some(a) => a.volatility_pct,
            None => range.min_volatility_pct + range.volatility_span() * 0.2,
        };
        Self {
            max_sharpe,
            max_return_pct,
            min_volatility_pct,
        }
    }
}
