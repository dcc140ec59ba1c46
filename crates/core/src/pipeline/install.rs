//! Mirror-aware package installation.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use mirror::{
    Choice, CommandRunner, InstallTarget, Mirror, PipCommand, Probe, Registry, Selection,
    choose_mirror, pip_config::write_config,
};

/// What the user asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub target: InstallTarget,
    pub upgrade: bool,
    /// Mirror name or label; probing is skipped when it is known.
    pub mirror: Option<String>,
}

/// Result of installing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub target: InstallTarget,
    /// Mirror the install finally succeeded from.
    pub used_mirror: Option<Mirror>,
}

impl InstallOutcome {
    pub fn success(&self) -> bool {
        self.used_mirror.is_some()
    }
}

/// Drives pip through the fastest mirror, falling back to the others.
pub struct Installer<'a, P, R> {
    registry: &'a Registry,
    probe: &'a P,
    runner: &'a R,
    python: String,
}

impl<'a, P: Probe, R: CommandRunner> Installer<'a, P, R> {
    pub fn new(
        registry: &'a Registry,
        probe: &'a P,
        runner: &'a R,
        python: impl Into<String>,
    ) -> Self {
        Self { registry, probe, runner, python: python.into() }
    }

    /// Resolve `manual` or probe the default mirrors, printing what happened.
    pub fn choose(&self, manual: Option<&str>) -> Result<Mirror> {
        if manual.and_then(|name| self.registry.find(name)).is_none() {
            println!("Testing mirror speed...");
        }
        let Choice { selection, probes } = choose_mirror(self.registry, self.probe, manual)?;

        for result in &probes {
            if result.reachable {
                println!("  ok   {}: {:.0}ms", result.mirror, result.latency_ms);
            } else {
                println!("  fail {}: unavailable", result.mirror);
            }
        }

        match &selection {
            Selection::Manual(mirror) => println!("Using requested mirror: {mirror}"),
            Selection::Fastest { mirror, latency_ms } => {
                println!("\nFastest mirror: {mirror} ({latency_ms:.0}ms)")
            }
            Selection::Fallback(mirror) => {
                println!("All mirrors unavailable, using {mirror}")
            }
        }
        Ok(*selection.mirror())
    }

    /// Install everything in `request`.
    ///
    /// The mirror is chosen once. A requirements file is one install; each
    /// package is installed on its own so one failure does not block the rest.
    pub fn install(&self, request: &InstallRequest) -> Result<Vec<InstallOutcome>> {
        let mirror = self.choose(request.mirror.as_deref())?;

        let targets = match &request.target {
            InstallTarget::Packages(packages) => packages
                .iter()
                .map(|package| InstallTarget::Packages(vec![package.clone()]))
                .collect(),
            target @ InstallTarget::Requirements(_) => vec![target.clone()],
        };

        targets
            .into_iter()
            .map(|target| self.install_from(&mirror, target, request.upgrade))
            .collect()
    }

    /// Install `target` from `mirror`, then from every other mirror in
    /// registry order until one succeeds.
    pub fn install_from(
        &self,
        mirror: &Mirror,
        target: InstallTarget,
        upgrade: bool,
    ) -> Result<InstallOutcome> {
        match &target {
            InstallTarget::Requirements(path) => {
                println!("\nInstalling from {}...", path.display())
            }
            InstallTarget::Packages(_) => println!("\nInstalling {target}..."),
        }
        println!("Using mirror: {mirror} ({})", mirror.url);

        let command = PipCommand::install(&self.python, mirror.url, &target, upgrade)?;
        println!("Running: {command}\n");

        if self.attempt(&command, true) {
            println!("Installed successfully");
            return Ok(InstallOutcome { target, used_mirror: Some(*mirror) });
        }

        println!("\nTrying alternate mirrors...");
        for alternate in self.registry.alternates(mirror) {
            println!("  trying {alternate}");
            let command = PipCommand::install(&self.python, alternate.url, &target, upgrade)?;
            if self.attempt(&command, false) {
                println!("Installed successfully from {alternate}");
                return Ok(InstallOutcome { target, used_mirror: Some(*alternate) });
            }
        }

        println!("All mirrors failed; check the network connection or package name");
        Ok(InstallOutcome { target, used_mirror: None })
    }

    fn attempt(&self, command: &PipCommand, verbose: bool) -> bool {
        match self.runner.run(command) {
            Ok(output) if output.success => {
                if verbose && !output.stdout.is_empty() {
                    println!("{}", output.stdout);
                }
                true
            }
            Ok(output) => {
                if verbose {
                    println!("Install failed");
                    if !output.stderr.is_empty() {
                        println!("Error output:\n{}", output.stderr);
                    }
                } else {
                    info!("{command} failed: {}", output.stderr.trim());
                }
                false
            }
            Err(e) => {
                warn!("{command}: {e}");
                false
            }
        }
    }

    /// Print `pip list`.
    pub fn list_installed(&self) -> Result<()> {
        let output = self
            .runner
            .run(&PipCommand::list(&self.python))
            .context("Failed to list installed packages")?;
        println!("Installed packages:");
        println!("{}", output.stdout);
        Ok(())
    }

    /// Write `mirror` (or the fastest one) to pip's config file at `path`.
    pub fn set_persistent_mirror(&self, name: Option<&str>, path: &Path) -> Result<Mirror> {
        let mirror = match name.and_then(|name| self.registry.find(name)) {
            Some(mirror) => *mirror,
            None => self.choose(None)?,
        };

        println!("\nPersisting mirror: {mirror}");
        println!("  URL: {}", mirror.url);

        let backup = write_config(path, mirror.url)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        if let Some(backup) = backup {
            println!("Previous config backed up to: {}", backup.display());
        }
        println!("Config saved to: {}", path.display());
        println!("Plain `pip install` will now use this mirror");
        Ok(mirror)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::PathBuf, time::Duration};

    use mirror::RunOutput;

    use super::*;

    const A: Mirror = Mirror::new("a", "A", "https://a.example/simple");
    const B: Mirror = Mirror::new("b", "B", "https://b.example/simple");
    const C: Mirror = Mirror::new("c", "C", "https://c.example/simple");
    const OFFICIAL: Mirror = Mirror::new("official", "O", "https://official.example/simple");

    fn registry() -> Registry {
        Registry::new(vec![A, B, C, OFFICIAL], &["a", "b", "c"], "official").unwrap()
    }

    struct FixedProbe;

    impl Probe for FixedProbe {
        fn probe(&self, url: &str) -> mirror::Result<Duration> {
            match url {
                "https://a.example/" => Ok(Duration::from_millis(50)),
                "https://b.example/" => Ok(Duration::from_millis(20)),
                _ => Err(mirror::Error::InvalidUrl(url.to_string())),
            }
        }
    }

    /// Succeeds only for commands that mention one of `working` hosts.
    struct FakeRunner {
        working: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new(working: &[&'static str]) -> Self {
            Self { working: working.to_vec(), calls: RefCell::default() }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &PipCommand) -> mirror::Result<RunOutput> {
            let line = command.to_string();
            self.calls.borrow_mut().push(line.clone());
            let success = self.working.iter().any(|host| line.contains(host));
            Ok(RunOutput { success, stdout: String::new(), stderr: "boom".into() })
        }
    }

    fn packages(names: &[&str]) -> InstallTarget {
        InstallTarget::Packages(names.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn primary_success_uses_primary() {
        let registry = registry();
        let runner = FakeRunner::new(&["a.example"]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");

        let outcome = installer.install_from(&A, packages(&["requests"]), false).unwrap();
        assert_eq!(outcome.used_mirror, Some(A));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn falls_back_to_the_one_working_alternate() {
        let registry = registry();
        let runner = FakeRunner::new(&["c.example"]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");

        let outcome = installer.install_from(&A, packages(&["requests"]), true).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.used_mirror, Some(C));

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("-i https://a.example/simple"));
        assert!(calls[1].contains("-i https://b.example/simple"));
        assert!(calls[2].contains("--upgrade"));
    }

    #[test]
    fn exhausting_every_mirror_fails() {
        let registry = registry();
        let runner = FakeRunner::new(&[]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");

        let outcome = installer.install_from(&B, packages(&["requests"]), false).unwrap();
        assert!(!outcome.success());
        assert_eq!(runner.calls().len(), 4);
    }

    #[test]
    fn packages_install_one_by_one_from_fastest() {
        let registry = registry();
        let runner = FakeRunner::new(&["b.example"]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");
        let request =
            InstallRequest { target: packages(&["requests", "numpy"]), upgrade: false, mirror: None };

        let outcomes = installer.install(&request).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.used_mirror == Some(B)));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].ends_with("requests"));
        assert!(calls[1].ends_with("numpy"));
    }

    #[test]
    fn manual_mirror_and_requirements_file() {
        let registry = registry();
        let runner = FakeRunner::new(&["official.example"]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");
        let request = InstallRequest {
            target: InstallTarget::Requirements(PathBuf::from("requirements.txt")),
            upgrade: false,
            mirror: Some("O".into()),
        };

        let outcomes = installer.install(&request).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].used_mirror, Some(OFFICIAL));
        assert!(runner.calls()[0].ends_with("-r requirements.txt"));
    }

    #[test]
    fn persistent_mirror_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pip.conf");
        let registry = registry();
        let runner = FakeRunner::new(&[]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");

        let mirror = installer.set_persistent_mirror(Some("c"), &path).unwrap();
        assert_eq!(mirror, C);
        let config = std::fs::read_to_string(&path).unwrap();
        assert!(config.contains("index-url = https://c.example/simple"));
    }

    #[test]
    fn persistent_mirror_probes_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pip.conf");
        let registry = registry();
        let runner = FakeRunner::new(&[]);
        let installer = Installer::new(&registry, &FixedProbe, &runner, "python3");

        assert_eq!(installer.set_persistent_mirror(None, &path).unwrap(), B);
    }
}
