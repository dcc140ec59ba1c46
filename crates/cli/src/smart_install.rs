//! `smart-install`: pip install through the fastest package index mirror.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser};
use mirror::{
    HttpProbe, InstallTarget, PROBE_TIMEOUT, ProcessRunner, Registry, default_python,
    pip_config::config_path,
};
use scrapekit_core::{InstallRequest, Installer};

#[derive(Debug, Parser)]
#[command(name = "smart-install", version)]
#[command(about = "Install Python packages through the fastest package index mirror")]
#[command(after_help = "Examples:\n  \
    smart-install requests pandas numpy\n  \
    smart-install --mirror aliyun requests\n  \
    smart-install --upgrade pip\n  \
    smart-install -r requirements.txt\n  \
    smart-install --set-mirror tsinghua")]
pub struct Cli {
    /// Packages to install
    pub packages: Vec<String>,

    /// Upgrade packages that are already installed
    #[arg(long)]
    pub upgrade: bool,

    /// Use this mirror instead of probing (name or label)
    #[arg(long, value_name = "NAME")]
    pub mirror: Option<String>,

    /// Install from a requirements file
    #[arg(short = 'r', long = "requirement", value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// List installed packages
    #[arg(long)]
    pub list: bool,

    /// Save a mirror to pip's config file; probes when no name is given
    #[arg(long, value_name = "NAME", num_args = 0..=1)]
    pub set_mirror: Option<Option<String>>,

    /// Probe mirror latency and report the fastest
    #[arg(long)]
    pub test: bool,

    /// Python interpreter that runs pip
    #[arg(long, default_value = default_python())]
    pub python: String,
}

/// The single action a command line resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Help,
    List,
    SetMirror(Option<String>),
    Test,
    Install(InstallRequest),
}

impl Cli {
    /// Resolve flags by precedence: list, set-mirror, test, requirements, packages.
    ///
    /// A command line with nothing to do asks for help.
    pub fn action(&self) -> Result<Action> {
        if self.is_empty() {
            return Ok(Action::Help);
        }
        if self.list {
            return Ok(Action::List);
        }
        if let Some(name) = &self.set_mirror {
            return Ok(Action::SetMirror(name.clone()));
        }
        if self.test {
            return Ok(Action::Test);
        }

        let target = match (&self.requirements, self.packages.is_empty()) {
            (Some(file), _) => InstallTarget::Requirements(file.clone()),
            (None, false) => InstallTarget::Packages(self.packages.clone()),
            (None, true) => bail!("Nothing to install; pass package names or -r FILE"),
        };
        Ok(Action::Install(InstallRequest {
            target,
            upgrade: self.upgrade,
            mirror: self.mirror.clone(),
        }))
    }

    fn is_empty(&self) -> bool {
        self.packages.is_empty()
            && self.requirements.is_none()
            && self.mirror.is_none()
            && self.set_mirror.is_none()
            && !(self.upgrade || self.list || self.test)
    }

    pub fn run(self) -> Result<()> {
        let action = self.action()?;
        if action == Action::Help {
            Self::command().print_help()?;
            return Ok(());
        }
        println!("Python smart package installer");

        let registry = Registry::builtin();
        let probe = HttpProbe::new(PROBE_TIMEOUT)?;
        let installer = Installer::new(&registry, &probe, &ProcessRunner, self.python);

        match action {
            Action::Help => {}
            Action::List => installer.list_installed()?,
            Action::SetMirror(name) => {
                installer.set_persistent_mirror(name.as_deref(), &config_path()?)?;
            }
            Action::Test => {
                installer.choose(None)?;
            }
            Action::Install(request) => {
                let failed: Vec<String> = installer
                    .install(&request)?
                    .iter()
                    .filter(|outcome| !outcome.success())
                    .map(|outcome| outcome.target.to_string())
                    .collect();
                if !failed.is_empty() {
                    bail!("Failed to install: {}", failed.join(", "));
                }
            }
        }
        Ok(())
    }
}
