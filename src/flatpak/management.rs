//! 安装 / 卸载 / 更新
//!
//! 这些命令没有可解析的输出，只以退出码判断成败，失败不会重试。

use super::error::Result;
use super::types::Package;
use super::{runner, Flatpak};
use log::{debug, info};
use std::path::Path;

impl Flatpak {
    fn mutate(&self, args: Vec<String>) -> Result<()> {
        debug!("执行: {}", runner::display_command(&self.command, &args));
        runner::run_checked(&self.command, &args)?;
        Ok(())
    }

    /// 非交互安装 (flatpak install -y [remote] <id>)，仓库由 `origin_policy` 决定
    pub fn install(&self, package: &Package) -> Result<()> {
        let mut args = vec!["install".to_string(), "-y".to_string()];
        if let Some(remote) = self.origin_policy.remote_for(package)? {
            args.push(remote.to_string());
        }
        args.push(package.id().to_string());

        info!("安装 '{}' ({})", package.name(), package.id());
        self.mutate(args)
    }

    /// 从 `.flatpakref` 文件安装 (flatpak install -y --from <file>)
    pub fn install_from_file(&self, path: &Path) -> Result<()> {
        info!("从文件安装 {}", path.display());
        self.mutate(vec![
            "install".to_string(),
            "-y".to_string(),
            "--from".to_string(),
            path.to_string_lossy().into_owned(),
        ])
    }

    /// 刷新远程仓库的 appstream 元数据；`None` 时刷新全部仓库
    /// (flatpak update --appstream [remote])
    pub fn refresh_appstream(&self, remote: Option<&str>) -> Result<()> {
        let mut args = vec!["update".to_string(), "--appstream".to_string()];
        match remote {
            Some(name) => {
                debug!("同步仓库 {} 的 appstream", name);
                args.push(name.to_string());
            }
            None => debug!("同步全部仓库的 appstream"),
        }
        self.mutate(args)
    }

    /// 非交互卸载 (flatpak uninstall -y [--delete-data] <id>)。
    ///
    /// `delete_data` 会永久删除用户数据，只执行一次。
    pub fn uninstall(&self, package: &Package, delete_data: bool) -> Result<()> {
        let mut args = vec!["uninstall".to_string(), "-y".to_string()];
        if delete_data {
            args.push("--delete-data".to_string());
        }
        args.push(package.id().to_string());

        info!(
            "卸载 '{}' ({}){}",
            package.name(),
            package.id(),
            if delete_data { "，并删除数据" } else { "" }
        );
        self.mutate(args)
    }

    /// 更新指定包；`None` 时更新全部 (flatpak update -y [<id>])
    pub fn update(&self, package: Option<&Package>) -> Result<()> {
        let mut args = vec!["update".to_string(), "-y".to_string()];
        match package {
            Some(pkg) => {
                info!("更新 '{}' ({})", pkg.name(), pkg.id());
                args.push(pkg.id().to_string());
            }
            None => info!("更新全部 Flatpak 包"),
        }
        self.mutate(args)
    }
}
