//! # Folio Core
//!
//! 포트폴리오 대시보드 분석 코어의 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자산 곡선 포인트 및 백테스트 요약
//! - 후보 포트폴리오 (앵커 / 합성 / 시뮬레이션)
//! - 구성비(composition) 정규화
//! - 에러 타입
//! - 로깅 인프라

pub mod composition;
pub mod error;
pub mod logging;
pub mod types;

pub use composition::{Composition, RawComposition, RawWeightEntry, WeightVector};
pub use error::{FolioError, FolioResult};
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
pub use types::{
    AnchorKind, BacktestSummary, CandidatePortfolio, EquityPoint, FrontierPayload,
    PortfolioSource, RawAnchorPortfolio, RawSimulatedPortfolio,
};
