//! pip command construction and execution.

use std::{
    fmt,
    path::PathBuf,
    process::{Command, Output},
};

use log::debug;

use crate::{Error, Result};

/// Python interpreter used when none is given.
pub fn default_python() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

/// Host part of a mirror URL, passed to pip as `--trusted-host`.
pub fn trusted_host(url: &str) -> Result<&str> {
    url.split_once("//")
        .and_then(|(_, rest)| rest.split('/').next())
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))
}

/// What to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTarget {
    Packages(Vec<String>),
    Requirements(PathBuf),
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallTarget::Packages(packages) => write!(f, "{}", packages.join(" ")),
            InstallTarget::Requirements(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A `python -m pip ...` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipCommand {
    program: String,
    args: Vec<String>,
}

impl PipCommand {
    fn pip(python: &str, subcommand: &str) -> Self {
        Self {
            program: python.to_string(),
            args: vec!["-m".into(), "pip".into(), subcommand.into()],
        }
    }

    /// `pip install` against `mirror_url`.
    pub fn install(
        python: &str,
        mirror_url: &str,
        target: &InstallTarget,
        upgrade: bool,
    ) -> Result<Self> {
        let host = trusted_host(mirror_url)?;
        let mut command = Self::pip(python, "install");

        if upgrade {
            command.args.push("--upgrade".into());
        }
        command.args.extend(["-i", mirror_url, "--trusted-host", host].map(String::from));

        match target {
            InstallTarget::Requirements(path) => {
                command.args.push("-r".into());
                command.args.push(path.to_string_lossy().into_owned());
            }
            InstallTarget::Packages(packages) => command.args.extend(packages.iter().cloned()),
        }
        Ok(command)
    }

    /// `pip list`.
    pub fn list(python: &str) -> Self {
        Self::pip(python, "list")
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for PipCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Executes pip commands.
pub trait CommandRunner {
    fn run(&self, command: &PipCommand) -> Result<RunOutput>;
}

/// Runs commands as blocking child processes with captured output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &PipCommand) -> Result<RunOutput> {
        debug!("running: {command}");
        Command::new(command.program())
            .args(command.args())
            .output()
            .map(RunOutput::from)
            .map_err(|source| Error::Spawn { program: command.program().to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_host_takes_authority() {
        assert_eq!(
            trusted_host("https://pypi.tuna.tsinghua.edu.cn/simple").unwrap(),
            "pypi.tuna.tsinghua.edu.cn"
        );
        assert_eq!(trusted_host("http://localhost:8080").unwrap(), "localhost:8080");
        assert!(trusted_host("pypi.org/simple").is_err());
        assert!(trusted_host("https:///simple").is_err());
    }

    #[test]
    fn install_packages_with_upgrade() {
        let target = InstallTarget::Packages(vec!["requests".into(), "numpy".into()]);
        let command =
            PipCommand::install("python3", "https://mirrors.aliyun.com/pypi/simple", &target, true)
                .unwrap();
        assert_eq!(
            command.to_string(),
            "python3 -m pip install --upgrade -i https://mirrors.aliyun.com/pypi/simple \
             --trusted-host mirrors.aliyun.com requests numpy"
        );
    }

    #[test]
    fn install_requirements_file() {
        let target = InstallTarget::Requirements(PathBuf::from("requirements.txt"));
        let command = PipCommand::install("py", "https://pypi.org/simple", &target, false).unwrap();
        assert_eq!(command.program(), "py");
        assert_eq!(
            command.args(),
            ["-m", "pip", "install", "-i", "https://pypi.org/simple", "--trusted-host", "pypi.org",
                "-r", "requirements.txt"]
        );
    }

    #[test]
    fn list_command() {
        assert_eq!(PipCommand::list("python3").to_string(), "python3 -m pip list");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let command = PipCommand::list("scrapekit-no-such-python");
        assert!(matches!(ProcessRunner.run(&command), Err(Error::Spawn { .. })));
    }
}
