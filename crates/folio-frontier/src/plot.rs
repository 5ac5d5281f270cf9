//! 최종 플롯 범위와 좌표 투영.
//!
//! 합성이 끝난 뒤 전체 포인트(앵커 + 시뮬레이션 + 합성)의 합집합으로
//! 한 번만 계산합니다. 합성 중에는 절대 사용하지 않습니다 (합성은
//! 별도의 사전 관측 범위를 씁니다).

use serde::{Deserialize, Serialize};

use folio_core::CandidatePortfolio;

/// 산점도 축 범위 (5% 패딩 포함).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRange {
    /// X축(변동성) 최소값
    pub min_volatility_pct: f64,
    /// X축(변동성) 최대값
    pub max_volatility_pct: f64,
    /// Y축(수익률) 최소값
    pub min_return_pct: f64,
    /// Y축(수익률) 최대값
    pub max_return_pct: f64,
}

impl PlotRange {
    /// 전체 포인트의 합집합에서 플롯 범위를 계산합니다.
    ///
    /// 변동성은 [0, 1] 이상으로 확장한 뒤 양쪽에 5% 패딩을 더합니다.
    /// Y축 최소값은 음수 수익률이 존재하면 ×1.05 (더 아래로), 아니면
    /// ×0.95를 적용합니다.
    pub fn from_candidates(candidates: &[CandidatePortfolio]) -> Self {
        let mut min_vol = 0.0f64;
        let mut max_vol = 1.0f64;
        let mut min_ret = 0.0f64;
        let mut max_ret = 1.0f64;
        let mut has_negative_return = false;

        for c in candidates {
            min_vol = min_vol.min(c.annual_volatility_pct);
            max_vol = max_vol.max(c.annual_volatility_pct);
            min_ret = min_ret.min(c.annual_return_pct);
            max_ret = max_ret.max(c.annual_return_pct);
            if c.annual_return_pct < 0.0 {
                has_negative_return = true;
            }
        }

        Self {
            min_volatility_pct: min_vol * 0.95,
            max_volatility_pct: max_vol * 1.05,
            min_return_pct: min_ret * if has_negative_return { 1.05 } else { 0.95 },
            max_return_pct: max_ret * 1.05,
        }
    }

    /// X축 범위 폭 (0이면 1로 대체).
    pub fn volatility_span(&self) -> f64 {
        let span = self.max_volatility_pct - self.min_volatility_pct;
        if span != 0.0 {
            span
        } else {
            1.0
        }
    }

    /// Y축 범위 폭 (0이면 1로 대체).
    pub fn return_span(&self) -> f64 {
        let span = self.max_return_pct - self.min_return_pct;
        if span != 0.0 {
            span
        } else {
            1.0
        }
    }

    /// 변동성을 픽셀 X 좌표로 투영합니다.
    pub fn project_x(&self, volatility_pct: f64, width: f64, margin: f64) -> f64 {
        margin
            + (volatility_pct - self.min_volatility_pct) / self.volatility_span()
                * (width - 2.0 * margin)
    }

    /// 수익률을 픽셀 Y 좌표로 투영합니다 (위쪽이 큰 값).
    pub fn project_y(&self, return_pct: f64, height: f64, margin: f64) -> f64 {
        height
            - margin
            - (return_pct - self.min_return_pct) / self.return_span() * (height - 2.0 * margin)
    }
}
