//! survey-reconcile
//!
//! 評価アンケート出力（表計算・旧形式テキスト）を正規レコードへ変換し、
//! 回答者名を人物画像に結び付ける。

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod scanner;
