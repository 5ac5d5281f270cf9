//! 분석 코어의 에러 타입.
//!
//! 이 시스템의 에러는 전부 "부족하거나 잘못된 입력"입니다.
//! 시스템 장애(네트워크, DB 등)는 상위 API 래퍼 계층의 책임이며
//! 이 코어에는 존재하지 않습니다.

use thiserror::Error;

/// 분석 코어 에러.
#[derive(Debug, Error)]
pub enum FolioError {
    /// 데이터 부족 (포인트 2개 미만, 빈 시계열 등)
    #[error("데이터 부족: {0}")]
    InsufficientData(String),

    /// 유의미한 드로다운 없음 (최대 낙폭 절대값 < 0.1%)
    ///
    /// 데이터 부족과는 구분되는 신호입니다. 호출자는 차트 대신
    /// 중립 메시지를 렌더링해야 합니다.
    #[error("유의미한 드로다운 없음")]
    NoSignificantDrawdown,

    /// 잘못된 입력 (비유한 값, 가중치 합 위반 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 분석 작업을 위한 Result 타입.
pub type FolioResult<T> = Result<T, FolioError>;

impl FolioError {
    /// 데이터 부족 신호인지 확인합니다.
    ///
    /// 호출자는 이 경우 해당 패널 렌더링을 건너뜁니다.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, FolioError::InsufficientData(_))
    }

    /// "드로다운 없음" 신호인지 확인합니다.
    ///
    /// 에러가 아니라 중립 메시지로 표시되어야 하는 상태입니다.
    pub fn is_no_significant_drawdown(&self) -> bool {
        matches!(self, FolioError::NoSignificantDrawdown)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_classification() {
        let err = FolioError::InsufficientData("2개 미만".to_string());
        assert!(err.is_insufficient_data());
        assert!(!err.is_no_significant_drawdown());
    }

    #[test]
    fn test_no_drawdown_classification() {
        let err = FolioError::NoSignificantDrawdown;
        assert!(err.is_no_significant_drawdown());
        assert!(!err.is_insufficient_data());
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: FolioError = parse_err.into();
        assert!(matches!(err, FolioError::Serialization(_)));
    }
}
