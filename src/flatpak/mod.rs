//! Flatpak 模块 — 对 flatpak 命令行的封装
//!
//! 所有操作都是同步的：每次调用启动一个 flatpak 进程并等待其结束。
//! 适配器本身不加锁，并发的安装/卸载需要调用方自行串行化。

pub mod error;
pub mod management;
pub mod parser;
pub mod runner;
pub mod types;

// 重新导出常用类型
pub use error::{FlatpakError, Result};
pub use parser::NO_MATCHES_MARKER;
pub use types::{CommandOutput, Field, Listing, Package, Remote, Scope};

use log::{debug, warn};
use parser::{
    columns_arg, is_no_matches, parse_list_output, parse_remotes_output, parse_search_output,
    LIST_COLUMNS, REMOTE_COLUMNS, SEARCH_COLUMNS, UPDATE_COLUMNS,
};
use serde::{Deserialize, Serialize};

/// 安装时如何选择远程仓库。
///
/// flatpak 在多个仓库都提供同一 ID 时的行为不由本程序决定，
/// 因此不做隐式默认，而是显式配置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginPolicy {
    /// 不传仓库名，交给 flatpak 自己解析（ID 有歧义时不保证选中哪个仓库）
    #[default]
    Unspecified,
    /// 使用包记录里的 origin（为空时退回不传）。
    ///
    /// 搜索结果的 origin 取自 remotes 列，应用存在于多个仓库时是逗号分隔的列表，
    /// 此时返回 `FlatpakError::AmbiguousOrigin`，不替用户挑选仓库。
    FromRecord,
    /// 总是使用指定仓库
    Fixed(String),
}

impl OriginPolicy {
    /// 针对某个包决定要传给 `flatpak install` 的仓库名
    pub fn remote_for<'a>(&'a self, package: &'a Package) -> Result<Option<&'a str>> {
        match self {
            OriginPolicy::Unspecified => Ok(None),
            OriginPolicy::FromRecord => {
                let origin = package.origin().trim();
                if origin.contains(',') {
                    return Err(FlatpakError::AmbiguousOrigin {
                        id: package.id().to_string(),
                        remotes: origin.to_string(),
                    });
                }
                Ok(Some(origin).filter(|o| !o.is_empty()))
            }
            OriginPolicy::Fixed(remote) => Ok(Some(remote.as_str())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flatpak {
    /// flatpak 的命令行前缀，如 `["flatpak"]` 或 `["flatpak-spawn", "--host", "flatpak"]`
    pub command: Vec<String>,
    /// 打印逐行的调试信息；只影响日志，不影响解析
    pub debug: bool,
    pub origin_policy: OriginPolicy,
}

impl Default for Flatpak {
    fn default() -> Self {
        Self::new(vec!["flatpak".to_string()])
    }
}

impl Flatpak {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            debug: false,
            origin_policy: OriginPolicy::default(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.origin_policy = policy;
        self
    }

    /// 执行 flatpak 子命令，非零退出码视为错误
    fn query(&self, args: Vec<String>) -> Result<CommandOutput> {
        debug!("执行: {}", runner::display_command(&self.command, &args));
        runner::run_checked(&self.command, &args)
    }

    fn trace_rows(&self, listing: &Listing) {
        if !self.debug {
            return;
        }
        for (i, pkg) in listing.packages.iter().enumerate() {
            debug!("Package ({}): {} [{}] {}", i, pkg.name(), pkg.id(), pkg.version());
        }
    }

    // ===== 查询 =====

    /// 列出已安装的包 (flatpak list)
    pub fn list(&self, scope: Scope) -> Result<Listing> {
        let mut args = vec!["list".to_string()];
        if let Some(flag) = scope.flag() {
            args.push(flag.to_string());
        }
        args.push(columns_arg(&LIST_COLUMNS));

        let output = self.query(args)?;
        let listing = parse_list_output(&output.stdout);
        if listing.is_empty() {
            debug!("没有已安装的 Flatpak 包 ({:?})", scope);
        }
        self.trace_rows(&listing);
        Ok(listing)
    }

    /// 已安装包数量
    pub fn count_installed(&self, scope: Scope) -> Result<usize> {
        Ok(self.list(scope)?.len())
    }

    /// 在所有远程仓库中搜索 (flatpak search)
    pub fn search(&self, term: &str) -> Result<Listing> {
        let term = term.trim();
        if term.is_empty() {
            return Err(FlatpakError::EmptySearchTerm);
        }

        let args = vec![
            "search".to_string(),
            columns_arg(&SEARCH_COLUMNS),
            term.to_string(),
        ];
        debug!("执行: {}", runner::display_command(&self.command, &args));
        let output = runner::run_capture(&self.command, &args)?;
        if self.debug {
            debug!("[flatpak 输出]: {:?}", output.stdout);
        }

        // 先认提示，再看退出码：部分版本无结果时也返回非零
        if is_no_matches(&output.combined_output()) {
            debug!("没有找到与 {:?} 匹配的包", term);
            return Ok(Listing::default());
        }
        if !output.success() {
            return Err(runner::exit_error(&self.command, &args, &output));
        }

        let listing = parse_search_output(&output.stdout);
        self.trace_rows(&listing);
        Ok(listing)
    }

    /// 可用更新 (flatpak remote-ls --updates [--app|--runtime])
    pub fn updates(&self, scope: Scope) -> Result<Listing> {
        let mut args = vec!["remote-ls".to_string(), "--updates".to_string()];
        if let Some(flag) = scope.flag() {
            args.push(flag.to_string());
        }
        args.push(columns_arg(&UPDATE_COLUMNS));

        let output = self.query(args)?;
        let listing = parse_search_output(&output.stdout);
        self.trace_rows(&listing);
        Ok(listing)
    }

    /// 可更新的包数量
    pub fn count_updates(&self, scope: Scope) -> Result<usize> {
        Ok(self.updates(scope)?.len())
    }

    /// 可浏览的远程仓库，跳过 OCI 和已禁用的仓库
    pub fn remotes(&self) -> Result<Vec<Remote>> {
        let output = self.query(vec!["remotes".to_string(), columns_arg(&REMOTE_COLUMNS)])?;
        let (remotes, skipped) = parse_remotes_output(&output.stdout);
        if skipped > 0 {
            warn!("flatpak remotes 有 {} 行无法解析，已跳过", skipped);
        }
        let remotes: Vec<Remote> = remotes
            .into_iter()
            .filter(Remote::is_browsable)
            .collect();
        debug!("Remotes: {:?}", remotes.iter().map(|r| &r.name).collect::<Vec<_>>());
        Ok(remotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(origin: &str) -> Package {
        Package::from_search_columns(["Foo", "", "com.foo", "1.0", "stable", origin])
    }

    #[test]
    fn test_origin_policy_remote_for() {
        let pkg = package("fedora");
        assert_eq!(OriginPolicy::Unspecified.remote_for(&pkg).unwrap(), None);
        assert_eq!(OriginPolicy::FromRecord.remote_for(&pkg).unwrap(), Some("fedora"));
        assert_eq!(OriginPolicy::FromRecord.remote_for(&package("")).unwrap(), None);
        assert_eq!(
            OriginPolicy::Fixed("flathub".into()).remote_for(&pkg).unwrap(),
            Some("flathub")
        );
    }

    #[test]
    fn test_from_record_rejects_multiple_remotes() {
        let pkg = package("flathub,fedora");
        match OriginPolicy::FromRecord.remote_for(&pkg) {
            Err(FlatpakError::AmbiguousOrigin { id, remotes }) => {
                assert_eq!(id, "com.foo");
                assert_eq!(remotes, "flathub,fedora");
            }
            other => panic!("expected AmbiguousOrigin, got {other:?}"),
        }
        // 固定仓库不受影响
        let fixed = OriginPolicy::Fixed("fedora".into());
        assert_eq!(fixed.remote_for(&pkg).unwrap(), Some("fedora"));
        assert_eq!(OriginPolicy::Unspecified.remote_for(&pkg).unwrap(), None);
    }

    #[test]
    fn test_search_rejects_blank_term() {
        let flatpak = Flatpak::new(vec!["/nonexistent/flatpak".to_string()]);
        assert!(matches!(
            flatpak.search("   "),
            Err(FlatpakError::EmptySearchTerm)
        ));
    }

    #[test]
    fn test_default_command_is_flatpak() {
        let flatpak = Flatpak::default();
        assert_eq!(flatpak.command, vec!["flatpak".to_string()]);
        assert!(!flatpak.debug);
        assert_eq!(flatpak.origin_policy, OriginPolicy::Unspecified);
    }
}
