//! 포트를 조합하는 단발성 유스케이스.

pub mod inspect_config;
