//! 드로다운 분석 모듈.
//!
//! 자산 곡선(가치 시계열) 하나를 입력으로:
//! - 실행 고점(running peak) 워크를 만들고,
//! - 단일 최악 에피소드(고점/저점/회복)를 추출하며,
//! - 역사적으로 구분되는 최악 3개 에피소드를 랭킹합니다.
//!
//! 두 출력은 같은 워크에서 독립적으로 계산됩니다.

pub mod episodes;
pub mod walk;

/// 저점에서 역방향으로 고점을 찾을 때의 허용 비율.
///
/// 정확한 고점에서의 부동소수 잡음을 흡수하기 위해
/// `value >= peak * 0.99999`를 고점 일치로 간주합니다.
pub const PEAK_MATCH_TOLERANCE: f64 = 0.99999;

/// 회복 판정 허용치 (%).
///
/// 드로다운이 이 값 이상으로 올라오면 (즉 -0.01% 이내) 회복으로
/// 간주합니다.
pub const RECOVERY_TOLERANCE_PCT: f64 = -0.01;

/// 에피소드 개시/확정 기준 낙폭 (%).
///
/// 낙폭이 -1%보다 얕은 구간은 에피소드로 세지 않습니다.
pub const EPISODE_MATERIALITY_PCT: f64 = -1.0;

/// 새 국소 고점 판정 트리거 비율.
///
/// 가치가 직전 국소 고점의 1.001배를 넘어야 새 고점으로 인정하고,
/// 열려 있던 에피소드를 마감합니다.
pub const NEW_PEAK_TRIGGER: f64 = 1.001;

/// "유의미한 드로다운"의 최소 크기 (%, 절대값).
///
/// 단일 최악 에피소드의 낙폭 절대값이 이보다 작으면
/// "유의미한 드로다운 없음"으로 신호합니다.
pub const SIGNIFICANT_DRAWDOWN_PCT: f64 = 0.1;
