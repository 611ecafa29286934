//! 适配器错误类型

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlatpakError {
    /// 无法启动外部命令（找不到可执行文件、没有权限等）
    #[error("无法执行 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} 执行失败 (exit={code:?}): {stderr}")]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("未知字段: {0}")]
    UnknownField(String),

    #[error("未知的包类型: {0} (可选 app / runtime / 空)")]
    InvalidScope(String),

    /// 记录的 origin 含多个仓库（来自搜索结果的 remotes 列），无法确定从哪个安装
    #[error("{id} 存在于多个仓库 ({remotes})，请用 --origin 指定")]
    AmbiguousOrigin { id: String, remotes: String },

    /// 同一 ID 匹配到多个包（不同分支，或 user 与 system 各有一份）
    #[error("{id} 匹配到多个包: {}", .refs.join(", "))]
    AmbiguousPackage { id: String, refs: Vec<String> },

    #[error("搜索关键词不能为空")]
    EmptySearchTerm,

    #[error("flatpak 命令不能为空")]
    EmptyCommand,
}

impl FlatpakError {
    /// 外部命令的退出码（仅 `Exit` 有）
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            FlatpakError::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlatpakError>;
