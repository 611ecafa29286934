//! Flatpak 相关数据类型定义

use super::error::FlatpakError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 命令输出结果
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// 包的字段名，与 `Package::field` 接受的名字一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Id,
    Version,
    Branch,
    Arch,
    Origin,
    Installation,
    Ref,
    Size,
    Options,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Name,
        Field::Description,
        Field::Id,
        Field::Version,
        Field::Branch,
        Field::Arch,
        Field::Origin,
        Field::Installation,
        Field::Ref,
        Field::Size,
        Field::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Id => "id",
            Field::Version => "version",
            Field::Branch => "branch",
            Field::Arch => "arch",
            Field::Origin => "origin",
            Field::Installation => "installation",
            Field::Ref => "ref",
            Field::Size => "size",
            Field::Options => "options",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FlatpakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FlatpakError::UnknownField(s.to_string()))
    }
}

/// flatpak 报告的一个软件包。
///
/// 只能由解析器从一行输出构造，之后不可变。
/// 搜索结果只填充 name / description / id / version / branch / origin，
/// 其余字段为空串，没有意义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    name: String,
    description: String,
    id: String,
    version: String,
    branch: String,
    arch: String,
    origin: String,
    installation: String,
    #[serde(rename = "ref")]
    ref_: String,
    size: String,
    options: String,
    #[serde(skip)]
    full: bool,
}

impl Package {
    /// `flatpak list` 的 11 列
    pub(crate) fn from_list_columns(columns: [&str; 11]) -> Self {
        let [name, description, id, version, branch, arch, origin, installation, ref_, size, options] =
            columns.map(str::to_string);
        Self {
            name,
            description,
            id,
            version,
            branch,
            arch,
            origin,
            installation,
            ref_,
            size,
            options,
            full: true,
        }
    }

    /// `flatpak search` / `remote-ls` 的 6 列
    pub(crate) fn from_search_columns(columns: [&str; 6]) -> Self {
        let [name, description, id, version, branch, origin] = columns.map(str::to_string);
        Self {
            name,
            description,
            id,
            version,
            branch,
            arch: String::new(),
            origin,
            installation: String::new(),
            ref_: String::new(),
            size: String::new(),
            options: String::new(),
            full: false,
        }
    }

    /// 按字段名取值，供通用的展示层使用
    pub fn field(&self, name: &str) -> Result<&str, FlatpakError> {
        name.parse::<Field>().map(|field| self.get(field))
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Id => &self.id,
            Field::Version => &self.version,
            Field::Branch => &self.branch,
            Field::Arch => &self.arch,
            Field::Origin => &self.origin,
            Field::Installation => &self.installation,
            Field::Ref => &self.ref_,
            Field::Size => &self.size,
            Field::Options => &self.options,
        }
    }

    /// 是否来自完整的 `flatpak list` 输出（11 个字段都有意义）
    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// 反向域名形式的应用 ID，如 `org.example.App`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 分支 (stable, beta, ...)
    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// 来源仓库 (remote) 名
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// 安装位置 (user, system, ...)
    pub fn installation(&self) -> &str {
        &self.installation
    }

    /// id/arch/branch 组合
    pub fn ref_(&self) -> &str {
        &self.ref_
    }

    /// 磁盘占用，原样保留 flatpak 的可读格式
    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    /// 用于在命令行上唯一指代这个包：完整 ref，搜索结果没有 ref 时用 `id//branch`
    pub fn display_ref(&self) -> String {
        if self.ref_.is_empty() {
            format!("{}//{}", self.id, self.branch)
        } else {
            self.ref_.clone()
        }
    }
}

/// 解析结果：按输入顺序的包，以及因列数不足被跳过的行数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub packages: Vec<Package>,
    pub skipped: usize,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn into_packages(self) -> Vec<Package> {
        self.packages
    }

    /// 按完整 ref 或 ID 查找唯一的包。
    ///
    /// ref 精确匹配优先；同一 ID 有多个包（不同分支、user 与 system 各装一份）时
    /// 返回 `AmbiguousPackage`，列出候选 ref。
    pub fn find_unique(&self, key: &str) -> Result<Option<&Package>, FlatpakError> {
        if let Some(pkg) = self.packages.iter().find(|p| !p.ref_.is_empty() && p.ref_ == key) {
            return Ok(Some(pkg));
        }

        let matches: Vec<&Package> = self.packages.iter().filter(|p| p.id == key).collect();
        match matches.as_slice() {
            [] => Ok(None),
            [pkg] => Ok(Some(pkg)),
            many => Err(FlatpakError::AmbiguousPackage {
                id: key.to_string(),
                refs: many
                    .iter()
                    .map(|p| {
                        if p.installation.is_empty() {
                            p.display_ref()
                        } else {
                            format!("{} ({})", p.display_ref(), p.installation)
                        }
                    })
                    .collect(),
            }),
        }
    }
}

/// `flatpak list` 的过滤范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    App,
    Runtime,
    #[default]
    Any,
}

impl Scope {
    pub(crate) fn flag(self) -> Option<&'static str> {
        match self {
            Scope::App => Some("--app"),
            Scope::Runtime => Some("--runtime"),
            Scope::Any => None,
        }
    }
}

impl FromStr for Scope {
    type Err = FlatpakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Scope::App),
            "runtime" => Ok(Scope::Runtime),
            "" => Ok(Scope::Any),
            other => Err(FlatpakError::InvalidScope(other.to_string())),
        }
    }
}

/// 已配置的远程仓库
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub title: String,
    pub url: String,
    pub options: String,
}

impl Remote {
    /// OCI 仓库和被禁用的仓库不提供可浏览的应用列表
    pub fn is_browsable(&self) -> bool {
        !self.url.starts_with("oci+")
            && !self.options.split(',').any(|opt| opt.trim() == "disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Package {
        Package::from_list_columns([
            "Foo", "Desc", "com.foo", "1.0", "main", "x86_64", "flathub", "system", "ref1",
            "10MB", "current",
        ])
    }

    #[test]
    fn test_field_accepts_every_known_name() {
        let pkg = sample();
        for field in Field::ALL {
            assert_eq!(pkg.field(field.as_str()).unwrap(), pkg.get(field));
        }
        assert_eq!(pkg.field("ref").unwrap(), "ref1");
        assert_eq!(pkg.field("options").unwrap(), "current");
    }

    #[test]
    fn test_field_rejects_unknown_name() {
        let pkg = sample();
        for bad in ["", "Name", "application", "remotes", "sizes"] {
            match pkg.field(bad) {
                Err(FlatpakError::UnknownField(name)) => assert_eq!(name, bad),
                other => panic!("expected UnknownField for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_search_form_leaves_list_only_fields_empty() {
        let pkg =
            Package::from_search_columns(["Foo", "Desc", "com.foo", "1.0", "stable", "flathub"]);
        assert!(!pkg.is_full());
        assert_eq!(pkg.origin(), "flathub");
        assert_eq!(pkg.arch(), "");
        assert_eq!(pkg.installation(), "");
        assert_eq!(pkg.size(), "");
    }

    fn installed(branch: &str, installation: &str) -> Package {
        let ref_ = format!("app/com.foo/x86_64/{branch}");
        Package::from_list_columns([
            "Foo", "", "com.foo", "1.0", branch, "x86_64", "flathub", installation, ref_.as_str(), "", "",
        ])
    }

    #[test]
    fn test_find_unique_by_id_and_ref() {
        let listing = Listing {
            packages: vec![installed("stable", "system"), installed("beta", "user")],
            skipped: 0,
        };

        match listing.find_unique("com.foo") {
            Err(FlatpakError::AmbiguousPackage { id, refs }) => {
                assert_eq!(id, "com.foo");
                assert_eq!(
                    refs,
                    vec![
                        "app/com.foo/x86_64/stable (system)",
                        "app/com.foo/x86_64/beta (user)"
                    ]
                );
            }
            other => panic!("expected AmbiguousPackage, got {other:?}"),
        }

        let beta = listing.find_unique("app/com.foo/x86_64/beta").unwrap().unwrap();
        assert_eq!(beta.branch(), "beta");
        assert!(listing.find_unique("org.other.App").unwrap().is_none());
    }

    #[test]
    fn test_find_unique_single_match() {
        let listing = Listing {
            packages: vec![installed("stable", "system")],
            skipped: 0,
        };
        let pkg = listing.find_unique("com.foo").unwrap().unwrap();
        assert_eq!(pkg.installation(), "system");
    }

    #[test]
    fn test_search_form_display_ref() {
        let pkg =
            Package::from_search_columns(["Foo", "Desc", "com.foo", "1.0", "stable", "flathub"]);
        assert_eq!(pkg.display_ref(), "com.foo//stable");
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("app".parse::<Scope>().unwrap(), Scope::App);
        assert_eq!("runtime".parse::<Scope>().unwrap(), Scope::Runtime);
        assert_eq!("".parse::<Scope>().unwrap(), Scope::Any);
        assert!(matches!(
            "apps".parse::<Scope>(),
            Err(FlatpakError::InvalidScope(_))
        ));
    }

    #[test]
    fn test_remote_browsable() {
        let remote = |url: &str, options: &str| Remote {
            name: "r".into(),
            title: String::new(),
            url: url.into(),
            options: options.into(),
        };
        assert!(remote("https://dl.flathub.org/repo/", "system").is_browsable());
        assert!(!remote("oci+https://registry.example", "system").is_browsable());
        assert!(!remote("https://example.org/repo", "system,disabled").is_browsable());
    }
}
