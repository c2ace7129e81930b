//! # omniscan-engine
//!
//! 스캔 오케스트레이션 엔진입니다. 프로세스/원격 백엔드 실행을
//! 지휘하고, 결과를 결정적 순서로 정렬·집계해 단일 결과로 병합합니다.
//!
//! ## 구조
//! - [`orchestrator`]: 종류별 오케스트레이터와 실패 격리
//! - [`rank`]: 결정적 랭킹, 통계 집계
//! - [`scan`]: 호출자 대면 진입점 [`scan::scan`]

pub mod orchestrator;
pub mod rank;
pub mod scan;

pub use orchestrator::{Orchestrator, ProcessOrchestrator, SemanticOrchestrator};
pub use rank::{rank, summarize};
pub use scan::{ScanMode, ScanOptions, scan};
