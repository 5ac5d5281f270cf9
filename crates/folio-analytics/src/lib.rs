//! 포트폴리오 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 드로다운 에피소드 탐지 및 랭킹 (자산 곡선 기반)
//! - 포트폴리오 성과 지표 계산 (연수익률, 변동성, 샤프, MDD)
//! - 차트 보조 유틸리티 (눈금 생성, 다운샘플링)
//!
//! 모든 계산은 동기적 순수 함수입니다. I/O와 상태는 상위 계층의
//! 책임입니다.
//!
//! # Re-exports
//!
//! - [`drawdown`]: 드로다운 워크, 최악 에피소드, 랭킹
//! - [`metrics`]: 포트폴리오 성과 지표
//! - [`charts`]: 눈금/다운샘플링 헬퍼

pub mod charts;
pub mod drawdown;
pub mod metrics;

// Drawdown 모듈 re-exports
pub use drawdown::episodes::{rank_worst_episodes, DrawdownEpisode, DEFAULT_EPISODE_COUNT};
pub use drawdown::walk::{DrawdownPoint, DrawdownWalk, EpisodeOverride, WorstEpisode};
pub use drawdown::{
    EPISODE_MATERIALITY_PCT, NEW_PEAK_TRIGGER, PEAK_MATCH_TOLERANCE, RECOVERY_TOLERANCE_PCT,
    SIGNIFICANT_DRAWDOWN_PCT,
};

// Metrics 모듈 re-exports
pub use metrics::{
    calculate_portfolio_performance, portfolio_daily_returns, prices_to_returns,
    prices_to_returns_decimal, AssetSeries, PortfolioPerformance, DEFAULT_RISK_FREE_RATE_PCT,
    TRADING_DAYS_PER_YEAR,
};

// Charts 모듈 re-exports
pub use charts::{nice_ticks, sample_even_indices, DEFAULT_TICK_COUNT, MAX_CHART_POINTS};
