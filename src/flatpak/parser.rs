//! 输出解析函数
//!
//! flatpak 的 `--columns` 输出：首行为表头，每行以 `\t` 分隔，末尾带换行。
//! 每种输出形态一个解析函数，列的数量和顺序只在这里出现。

use super::types::{Listing, Package, Remote};

/// `flatpak list` 请求的列，顺序与 `Package::from_list_columns` 一致
pub const LIST_COLUMNS: [&str; 11] = [
    "name",
    "description",
    "application",
    "version",
    "branch",
    "arch",
    "origin",
    "installation",
    "ref",
    "size",
    "options",
];

/// `flatpak search` 请求的列
pub const SEARCH_COLUMNS: [&str; 6] = [
    "name",
    "description",
    "application",
    "version",
    "branch",
    "remotes",
];

/// `flatpak remote-ls --updates` 请求的列，与搜索结果同形
pub const UPDATE_COLUMNS: [&str; 6] = [
    "name",
    "description",
    "application",
    "version",
    "branch",
    "origin",
];

pub const REMOTE_COLUMNS: [&str; 4] = ["name", "title", "url", "options"];

/// 搜索无结果时 flatpak 打印的提示。
///
/// 这是与 flatpak 文案的耦合：若将来文案改变，只需改这里；
/// 若 flatpak 提供了结构化的“无结果”信号（退出码或 JSON 输出），应改用那个。
pub const NO_MATCHES_MARKER: &str = "No matches found";

/// 生成 `--columns=a,b,c` 参数
pub fn columns_arg(columns: &[&str]) -> String {
    format!("--columns={}", columns.join(","))
}

/// 输出中是否带有“无结果”提示
pub fn is_no_matches(output: &str) -> bool {
    output.contains(NO_MATCHES_MARKER)
}

/// 把输出切成数据行：丢弃首行表头（不校验内容）、
/// 丢弃末尾换行产生的那一个空串，并跳过其余空行。
fn data_rows(output: &str) -> impl Iterator<Item = &str> {
    let mut rows: Vec<&str> = output.split('\n').collect();
    if rows.last() == Some(&"") {
        rows.pop();
    }
    rows.into_iter()
        .skip(1)
        .map(|row| row.strip_suffix('\r').unwrap_or(row))
        .filter(|row| !row.is_empty())
}

/// 按列数切分一行；列数不足返回 None，多余的列忽略
fn split_columns<const N: usize>(row: &str) -> Option<[&str; N]> {
    let mut columns = [""; N];
    let mut parts = row.split('\t');
    for slot in columns.iter_mut() {
        *slot = parts.next()?;
    }
    Some(columns)
}

/// 通用解析：每个数据行切成 N 列后交给 `build`
fn parse_rows<const N: usize, T>(output: &str, build: impl Fn([&str; N]) -> T) -> (Vec<T>, usize) {
    let mut items = Vec::new();
    let mut skipped = 0;

    for (i, row) in data_rows(output).enumerate() {
        match split_columns::<N>(row) {
            Some(columns) => items.push(build(columns)),
            None => {
                log::warn!("跳过第 {} 行：列数不足 {} ({:?})", i + 1, N, row);
                skipped += 1;
            }
        }
    }

    (items, skipped)
}

/// 解析 `flatpak list --columns=...` 输出（11 列）
pub fn parse_list_output(output: &str) -> Listing {
    let (packages, skipped) = parse_rows(output, Package::from_list_columns);
    Listing { packages, skipped }
}

/// 解析 `flatpak search --columns=...` 输出（6 列）。
/// 调用方应先用 `is_no_matches` 判断无结果的情况。
pub fn parse_search_output(output: &str) -> Listing {
    let (packages, skipped) = parse_rows(output, Package::from_search_columns);
    Listing { packages, skipped }
}

/// 解析 `flatpak remotes --columns=name,title,url,options` 输出，
/// 返回仓库列表和被跳过的行数
pub fn parse_remotes_output(output: &str) -> (Vec<Remote>, usize) {
    parse_rows(output, |[name, title, url, options]: [&str; 4]| Remote {
        name: name.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        options: options.to_string(),
    })
}
