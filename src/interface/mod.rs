//! Interface layer
//! CLI 인자 파싱, 터미널 입력, 애플리케이션 조립을 담당한다.

pub mod cli;
