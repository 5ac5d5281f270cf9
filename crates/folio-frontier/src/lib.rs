//! 효율적 프런티어 합성 엔진.
//!
//! 외부 최적화 서비스가 보낸 앵커 포트폴리오와 원시 시뮬레이션을
//! 받아, 수익률-변동성 산점도를 시각적으로 채우는 합성 포인트
//! 군집을 생성합니다. 합성 포인트는 검증된 실현 가능 포트폴리오가
//! 아니라 시각화용이며, 강등 패스를 통해 앵커보다 좋아 보이지
//! 않도록 보장됩니다.
//!
//! # Re-exports
//!
//! - [`anchors`]: 앵커 수집, 관측 범위, 강등 기준
//! - [`config`]: 합성 설정
//! - [`strategies`]: 진행률 의존 생성 전략
//! - [`synthesizer`]: 합성 실행기
//! - [`plot`]: 최종 플롯 범위와 좌표 투영

pub mod anchors;
pub mod config;
pub mod plot;
pub mod strategies;
pub mod synthesizer;

pub use anchors::{Anchor, AnchorSet, Benchmarks, ObservedRange};
pub use config::SynthesisConfig;
pub use plot::PlotRange;
pub use strategies::{
    dispersion_point, extreme_point, gaussian, generate_point, mixture_point, RawPoint,
    DISPERSION_PHASE_END, DISPERSION_SIGMA, MIXTURE_JITTER_SIGMA, MIXTURE_PHASE_END,
};
pub use synthesizer::{FrontierSynthesizer, SynthesisOutcome};
