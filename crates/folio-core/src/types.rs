//! 분석 코어의 도메인 타입.
//!
//! 외부 백테스트/최적화 서비스의 응답에서 역직렬화되는 입력 타입과,
//! 프레젠테이션 계층으로 전달되는 출력 타입을 정의합니다.
//!
//! 외부 서비스는 필드 이름이 일정하지 않으므로 (대문자/스네이크 혼용,
//! 구성비 키 5종) serde alias로 전부 수용합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::composition::{Composition, RawComposition};

/// 자산 곡선의 단일 포인트.
///
/// 백테스트 서비스가 생성하며, 날짜 오름차순으로 정렬되어 도착합니다.
/// 어떤 분석이든 최소 2개 포인트가 필요합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// 날짜
    #[serde(alias = "Date")]
    pub date: NaiveDate,

    /// 자산 가치 (음수 불가)
    #[serde(alias = "Value")]
    pub value: f64,

    /// 누적 투자 원금 (적립식 백테스트에서만 존재)
    #[serde(
        default,
        alias = "TotalInvested",
        alias = "Total_invested",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_invested: Option<f64>,
}

impl EquityPoint {
    /// 새 포인트를 생성합니다.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            total_invested: None,
        }
    }
}

/// 백테스트 서비스가 곡선과 함께 보내는 요약 레코드.
///
/// 단일 최악 에피소드 추출은 이 값들을 재현/검증하는 것이 기대됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// 사전 계산된 최대 낙폭 (%, 음수)
    #[serde(default)]
    pub max_drawdown: Option<f64>,

    /// 최대 낙폭 발생일 (고점 날짜)
    #[serde(default)]
    pub max_drawdown_date: Option<NaiveDate>,

    /// 회복 완료일
    #[serde(default)]
    pub max_recovery_end_date: Option<NaiveDate>,

    /// 고점에서 회복까지의 일수
    #[serde(default)]
    pub max_recovery_time_days: Option<i64>,
}

/// 앵커 포트폴리오의 종류.
///
/// 앵커는 외부 최적화 엔진이 이미 최적이라고 판정한 기준점입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorKind {
    /// 최대 샤프 비율 포트폴리오
    MaxSharpe,
    /// 최소 변동성 포트폴리오
    MinVolatility,
    /// 최대 수익률 포트폴리오
    MaxReturn,
    /// 사용자가 입력한 정적 포트폴리오
    UserStatic,
}

impl AnchorKind {
    /// 차트 레이블용 표시 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            AnchorKind::MaxSharpe => "Max Sharpe",
            AnchorKind::MinVolatility => "Min Vol",
            AnchorKind::MaxReturn => "Max Return",
            AnchorKind::UserStatic => "User Static",
        }
    }
}

/// 후보 포트폴리오의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortfolioSource {
    /// 외부 최적화 엔진의 앵커
    Anchor(AnchorKind),
    /// 외부 엔진의 원시 시뮬레이션
    Simulated,
    /// 프런티어 합성기가 생성
    Synthetic,
}

/// 산점도에 렌더링되는 후보 포트폴리오.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePortfolio {
    /// 연환산 수익률 (%)
    pub annual_return_pct: f64,

    /// 연환산 변동성 (%)
    pub annual_volatility_pct: f64,

    /// 샤프 비율
    pub sharpe_ratio: f64,

    /// 최대 낙폭 (%, 음수), 알려진 경우에만
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown_pct: Option<f64>,

    /// 정규화된 구성비. "완전 투자"가 아닌 포인트는 렌더링 전에
    /// 폐기됩니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<Composition>,

    /// 출처 (앵커 / 시뮬레이션 / 합성)
    pub source: PortfolioSource,
}

impl CandidatePortfolio {
    /// 주어진 무위험 수익률로 샤프 비율을 재계산합니다.
    ///
    /// 변동성이 0이면 0을 반환합니다 (미정의 대신 중립값).
    pub fn implied_sharpe(&self, risk_free_rate_pct: f64) -> f64 {
        if self.annual_volatility_pct != 0.0 {
            (self.annual_return_pct - risk_free_rate_pct) / self.annual_volatility_pct
        } else {
            0.0
        }
    }
}

/// 최적화 서비스가 보내는 원시 시뮬레이션 포트폴리오.
///
/// 좌표는 `Volatility`/`annual_volatility`, `Return`/`cagr_approx` 중
/// 어느 키로도 도착할 수 있고, 구성비는 다섯 가지 키 중 하나입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSimulatedPortfolio {
    /// 연환산 변동성 (%)
    #[serde(default, alias = "Volatility", alias = "annual_volatility")]
    pub volatility: Option<f64>,

    /// 연환산 수익률 (%)
    #[serde(default, alias = "Return", alias = "cagr_approx")]
    pub annual_return: Option<f64>,

    /// 샤프 비율 (없으면 좌표에서 유도)
    #[serde(default, alias = "Sharpe")]
    pub sharpe: Option<f64>,

    /// 구성비 (5가지 대체 키 전부 수용)
    #[serde(
        default,
        alias = "weights",
        alias = "allocation",
        alias = "static_weights",
        alias = "portfolio_weights"
    )]
    pub composition: Option<RawComposition>,
}

impl RawSimulatedPortfolio {
    /// 변동성 좌표 (없으면 0).
    pub fn volatility_pct(&self) -> f64 {
        self.volatility.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// 수익률 좌표 (없으면 0).
    pub fn annual_return_pct(&self) -> f64 {
        self.annual_return.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// 샤프 비율. 없으면 좌표와 무위험 수익률에서 유도하고,
    /// 변동성이 0이면 0을 반환합니다.
    pub fn sharpe_ratio(&self, risk_free_rate_pct: f64) -> f64 {
        match self.sharpe {
            Some(s) if s.is_finite() => s,
            _ => {
                let vol = self.volatility_pct();
                if vol != 0.0 {
                    (self.annual_return_pct() - risk_free_rate_pct) / vol
                } else {
                    0.0
                }
            }
        }
    }

    /// 정규화된 구성비 (없거나 비정상이면 None).
    pub fn normalized_composition(&self) -> Option<Composition> {
        self.composition.as_ref().and_then(Composition::from_raw)
    }
}

/// 최적화 서비스가 보내는 명명된 앵커 포트폴리오.
///
/// 시뮬레이션 레코드와 달리 구성비 키는 `weights`/`composition`/
/// `static_weights` 세 가지만 사용됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnchorPortfolio {
    /// 연환산 변동성 (%)
    #[serde(default, alias = "Volatility", alias = "annual_volatility")]
    pub volatility: Option<f64>,

    /// 연환산 수익률 (%)
    #[serde(default, alias = "Return", alias = "cagr_approx")]
    pub annual_return: Option<f64>,

    /// 샤프 비율
    #[serde(default, alias = "Sharpe")]
    pub sharpe: Option<f64>,

    /// 구성비
    #[serde(default, alias = "weights", alias = "static_weights")]
    pub composition: Option<RawComposition>,
}

impl RawAnchorPortfolio {
    /// 변동성 좌표 (없으면 0).
    pub fn volatility_pct(&self) -> f64 {
        self.volatility.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// 수익률 좌표 (없으면 0).
    pub fn annual_return_pct(&self) -> f64 {
        self.annual_return.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// 정규화된 구성비.
    pub fn normalized_composition(&self) -> Option<Composition> {
        self.composition.as_ref().and_then(Composition::from_raw)
    }
}

/// 효율적 프런티어 서비스의 전체 응답.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontierPayload {
    /// 무위험 수익률 (%, 없으면 0)
    #[serde(default)]
    pub risk_free_rate_percent: Option<f64>,

    /// 원시 시뮬레이션 포트폴리오 (키 이름 3종 수용)
    #[serde(default, alias = "simulated_portfolios", alias = "simulations")]
    pub simulated: Vec<RawSimulatedPortfolio>,

    /// 최대 샤프 앵커
    #[serde(default)]
    pub max_sharpe_portfolio: Option<RawAnchorPortfolio>,

    /// 최소 변동성 앵커
    #[serde(default)]
    pub min_volatility_portfolio: Option<RawAnchorPortfolio>,

    /// 최대 수익률 앵커
    #[serde(default)]
    pub max_return_portfolio: Option<RawAnchorPortfolio>,

    /// 사용자 정적 포트폴리오 포인트
    #[serde(default)]
    pub user_portfolio_point: Option<RawAnchorPortfolio>,
}

impl FrontierPayload {
    /// 무위험 수익률 (%). 페이로드에 없으면 0.
    pub fn risk_free_rate_pct(&self) -> f64 {
        self.risk_free_rate_percent
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}
