//! Static table of package index mirrors.

use std::fmt;

use crate::{Error, Result};

/// A package index mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    /// ASCII identifier used on the command line.
    pub name: &'static str,
    /// Human-readable name; also accepted on the command line.
    pub label: &'static str,
    /// Simple index URL.
    pub url: &'static str,
}

impl Mirror {
    pub const fn new(name: &'static str, label: &'static str, url: &'static str) -> Self {
        Self { name, label, url }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.label == name
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.label)
    }
}

/// Known mirrors, in fallback order.
pub const MIRRORS: &[Mirror] = &[
    Mirror::new("tsinghua", "清华", "https://pypi.tuna.tsinghua.edu.cn/simple"),
    Mirror::new("aliyun", "阿里云", "https://mirrors.aliyun.com/pypi/simple"),
    Mirror::new("tencent", "腾讯云", "https://mirrors.cloud.tencent.com/pypi/simple"),
    Mirror::new("huawei", "华为云", "https://repo.huaweicloud.com/repository/pypi/simple"),
    Mirror::new("douban", "豆瓣", "https://pypi.douban.com/simple"),
    Mirror::new("ustc", "中科大", "https://pypi.mirrors.ustc.edu.cn/simple"),
    Mirror::new("netease", "网易", "https://mirrors.163.com/pypi/simple"),
    Mirror::new("pypi", "官方源", "https://pypi.org/simple"),
];

/// Mirrors probed when none is requested explicitly.
pub const DEFAULT_PROBE_SET: &[&str] = &["tsinghua", "aliyun", "tencent", "douban"];

/// Mirror used when every probe fails.
pub const OFFICIAL_MIRROR: &str = "pypi";

/// An ordered set of mirrors with a probe subset and an official fallback.
#[derive(Debug, Clone)]
pub struct Registry {
    mirrors: Vec<Mirror>,
    probe_set: Vec<Mirror>,
    official: Mirror,
}

impl Registry {
    /// Build a registry, resolving the probe set and official mirror by name.
    pub fn new(mirrors: Vec<Mirror>, probe_set: &[&str], official: &str) -> Result<Self> {
        let lookup = |name: &str| {
            mirrors
                .iter()
                .find(|m| m.matches(name))
                .copied()
                .ok_or_else(|| Error::UnknownMirror(name.to_string()))
        };
        let probe_set = probe_set.iter().map(|&name| lookup(name)).collect::<Result<Vec<_>>>()?;
        let official = lookup(official)?;
        Ok(Self { mirrors, probe_set, official })
    }

    /// The built-in table of mirrors.
    pub fn builtin() -> Self {
        let probe_set = DEFAULT_PROBE_SET
            .iter()
            .filter_map(|name| MIRRORS.iter().find(|m| m.name == *name))
            .copied()
            .collect();
        let official = MIRRORS
            .iter()
            .find(|m| m.name == OFFICIAL_MIRROR)
            .copied()
            .unwrap_or(MIRRORS[MIRRORS.len() - 1]);
        Self { mirrors: MIRRORS.to_vec(), probe_set, official }
    }

    pub fn find(&self, name: &str) -> Option<&Mirror> {
        self.mirrors.iter().find(|m| m.matches(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mirror> {
        self.mirrors.iter()
    }

    pub fn probe_set(&self) -> &[Mirror] {
        &self.probe_set
    }

    pub fn official(&self) -> &Mirror {
        &self.official
    }

    /// Every mirror except `used`, in registry order.
    pub fn alternates<'a>(&'a self, used: &'a Mirror) -> impl Iterator<Item = &'a Mirror> + 'a {
        self.mirrors.iter().filter(move |m| m.name != used.name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
