//! Domain layer
//! 명령 해석 규칙(토큰화/명령 테이블/랭킹/스택)을 외부 의존성 없이 표현한다.

pub mod command;
pub mod error;
pub mod injectables;
pub mod ranker;
pub mod stack;
pub mod tokenizer;
pub mod value;
