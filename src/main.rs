use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use flati::{Config, Field, Flatpak, OriginPolicy, Package, Scope};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flati", version, about = "Flatpak 软件包管理")]
struct Cli {
    /// 打印调试信息
    #[arg(short, long, global = true)]
    debug: bool,

    /// 配置文件路径（默认 ~/.config/flati/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 列出已安装的包
    List {
        /// 只列出应用
        #[arg(long, conflicts_with = "runtime")]
        app: bool,
        /// 只列出运行时
        #[arg(long)]
        runtime: bool,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 在远程仓库中搜索
    Search {
        term: String,
        #[arg(long)]
        json: bool,
    },
    /// 安装指定 ID 的包
    Install {
        id: String,
        /// 指定远程仓库，覆盖配置中的 install_origin
        #[arg(long)]
        origin: Option<String>,
    },
    /// 从 .flatpakref 文件安装
    InstallFile { path: PathBuf },
    /// 卸载已安装的包
    Uninstall {
        id: String,
        /// 同时永久删除用户数据
        #[arg(long)]
        delete_data: bool,
    },
    /// 列出可浏览的远程仓库
    Remotes,
    /// 列出可用更新
    Updates {
        /// 只列出应用
        #[arg(long, conflicts_with = "runtime")]
        app: bool,
        /// 只列出运行时
        #[arg(long)]
        runtime: bool,
    },
    /// 更新指定的包，不给 ID 时更新全部
    Update { id: Option<String> },
    /// 同步远程仓库的 appstream 元数据，不给仓库名时同步全部
    Refresh { remote: Option<String> },
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default()?,
    };

    // --debug 与配置文件任一开启即可
    let debug = cli.debug || config.debug;
    init_logger(debug);

    let flatpak = config.adapter().with_debug(debug);
    run(cli.command, flatpak)
}

fn run(command: Commands, flatpak: Flatpak) -> Result<()> {
    match command {
        Commands::List { app, runtime, json } => {
            let listing = flatpak.list(scope_of(app, runtime)).context("获取已安装列表失败")?;
            report_skipped(listing.skipped);
            print_packages(&listing.packages, &FULL_COLUMNS, json)
        }
        Commands::Search { term, json } => {
            let listing = flatpak.search(&term).context("搜索失败")?;
            report_skipped(listing.skipped);
            if listing.is_empty() && !json {
                println!("没有找到与 \"{}\" 匹配的包", term);
                return Ok(());
            }
            print_packages(&listing.packages, &SHORT_COLUMNS, json)
        }
        Commands::Install { id, origin } => {
            let flatpak = match origin {
                Some(remote) => flatpak.with_origin_policy(OriginPolicy::Fixed(remote)),
                None => flatpak,
            };
            let package = find_remote(&flatpak, &id)?;
            flatpak.install(&package)?;
            println!("已安装 {}", package.id());
            Ok(())
        }
        Commands::InstallFile { path } => {
            flatpak.install_from_file(&path)?;
            println!("已从 {} 安装", path.display());
            Ok(())
        }
        Commands::Uninstall { id, delete_data } => {
            let package = find_installed(&flatpak, &id)?;
            flatpak.uninstall(&package, delete_data)?;
            println!("已卸载 {}", package.id());
            Ok(())
        }
        Commands::Remotes => {
            for remote in flatpak.remotes()? {
                println!("{}\t{}\t{}", remote.name, remote.title, remote.url);
            }
            Ok(())
        }
        Commands::Updates { app, runtime } => {
            let listing = flatpak.updates(scope_of(app, runtime))?;
            if listing.is_empty() {
                println!("没有可用更新");
                return Ok(());
            }
            print_packages(&listing.packages, &SHORT_COLUMNS, false)
        }
        Commands::Update { id } => {
            match id {
                Some(id) => {
                    let package = find_installed(&flatpak, &id)?;
                    flatpak.update(Some(&package))?;
                }
                None => flatpak.update(None)?,
            }
            println!("更新完成");
            Ok(())
        }
        Commands::Refresh { remote } => {
            flatpak.refresh_appstream(remote.as_deref())?;
            println!("元数据已同步");
            Ok(())
        }
    }
}

fn scope_of(app: bool, runtime: bool) -> Scope {
    if app {
        Scope::App
    } else if runtime {
        Scope::Runtime
    } else {
        Scope::Any
    }
}

const FULL_COLUMNS: [Field; 6] = [
    Field::Name,
    Field::Id,
    Field::Version,
    Field::Branch,
    Field::Origin,
    Field::Size,
];

const SHORT_COLUMNS: [Field; 5] = [
    Field::Name,
    Field::Id,
    Field::Version,
    Field::Branch,
    Field::Origin,
];

fn print_packages(packages: &[Package], columns: &[Field], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(packages)?);
        return Ok(());
    }
    for pkg in packages {
        let row: Vec<&str> = columns.iter().map(|field| pkg.get(*field)).collect();
        println!("{}", row.join("\t"));
    }
    Ok(())
}

fn report_skipped(skipped: usize) {
    if skipped > 0 {
        log::warn!("有 {} 行输出无法解析，已跳过", skipped);
    }
}

/// 按 ID 查找已安装的包；有多个候选时报错而不是任选一个
fn find_installed(flatpak: &Flatpak, id: &str) -> Result<Package> {
    flatpak
        .list(Scope::Any)?
        .find_unique(id)?
        .cloned()
        .ok_or_else(|| anyhow!("未安装: {}", id))
}

fn find_remote(flatpak: &Flatpak, id: &str) -> Result<Package> {
    flatpak
        .search(id)?
        .find_unique(id)?
        .cloned()
        .ok_or_else(|| anyhow!("在远程仓库中找不到: {}", id))
}
