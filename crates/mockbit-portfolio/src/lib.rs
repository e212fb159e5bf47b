//! # Mockbit Portfolio
//!
//! 보유 자산 평가 및 손익 집계 모듈.
//!
//! 체결 기록 목록과 현재가 스냅샷으로부터 총 매수 금액, 총 평가 금액,
//! 평가 손익, 수익률을 계산합니다. 파이프라인은 세 단계로 구성됩니다:
//!
//! 1. [`aggregate`] - 체결 기록을 마켓별 포지션으로 접기
//! 2. [`valuate`] - 포지션을 현재가로 평가
//! 3. [`summarize`] - 평가 결과에서 손익/수익률 도출
//!
//! 모든 함수는 순수하고 동기적입니다. 네트워크, 타이머, 공유 상태가
//! 없으므로 여러 뷰가 시세 틱마다 동시에 호출해도 안전합니다.
//! 파생 값은 호출 시마다 입력에서 다시 계산됩니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use mockbit_portfolio::{aggregate, summarize, valuate};
//!
//! let positions = aggregate(&records);
//! let report = valuate(&positions, &prices);
//! let summary = summarize(report.total_cost, report.total_value);
//! println!("평가 손익: {} ({}%)", summary.profit, summary.profit_rate);
//! ```

pub mod aggregate;
pub mod summary;
pub mod valuation;

pub use aggregate::*;
pub use summary::*;
pub use valuation::*;
