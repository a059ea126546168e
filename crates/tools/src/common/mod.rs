//! ツール共通モジュール

pub mod io;
