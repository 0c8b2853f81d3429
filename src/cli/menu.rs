//! Interactive menu, shown by `dm` with no subcommand or `dm menu`.
//!
//! Escape in a sub-menu returns to the top menu; Escape at the top or
//! choosing Quit exits.

use super::Context;
use super::doctor::write_report;
use super::find::{root_or_cwd, write_hits};
use crate::doctor::{Doctor, UreqProbe};
use crate::error::Result;
use crate::launcher::{alias, jump, plugin, project};
use crate::tools::filesearch::{self, SearchOptions};
use crate::tools::{parse_duration, recent, snapshot};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Asks the user to choose or type something.
pub trait Prompter {
    /// Choose one of `items`. `None` means the user backed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Read a line of text, pre-filled with `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn input(&mut self, prompt: &str, default: &str) -> Result<String>;
}

/// [`Prompter`] on the terminal via `dialoguer`.
#[derive(Default)]
pub struct TermPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TermPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()?)
    }

    fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?)
    }
}

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Pick a jump and print its directory.
    Jump,
    /// Pick and run an alias.
    Alias,
    /// Pick a project, then one of its actions.
    Project,
    /// Pick and run a plugin.
    Plugin,
    /// Files modified within a typed duration.
    Recent,
    /// Files matching a typed name.
    Find,
    /// Describe this machine and session.
    Snapshot,
    /// Run the health checks.
    Doctor,
    /// Leave the menu.
    Quit,
}

impl MenuAction {
    /// Entries in display order.
    pub const ALL: [Self; 9] = [
        Self::Jump,
        Self::Alias,
        Self::Project,
        Self::Plugin,
        Self::Recent,
        Self::Find,
        Self::Snapshot,
        Self::Doctor,
        Self::Quit,
    ];

    /// Menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Jump => "Jump",
            Self::Alias => "Run alias",
            Self::Project => "Project action",
            Self::Plugin => "Plugin",
            Self::Recent => "Recent files",
            Self::Find => "Find files",
            Self::Snapshot => "Snapshot",
            Self::Doctor => "Doctor",
            Self::Quit => "Quit",
        }
    }
}

/// The menu loop.
pub struct Menu<'a, P, W> {
    ctx: &'a Context,
    prompter: P,
    out: W,
    version: &'a str,
    root: PathBuf,
}

impl<'a, P: Prompter, W: Write> Menu<'a, P, W> {
    /// Create a menu. `root` is where recent/find look.
    #[must_use]
    pub fn new(ctx: &'a Context, prompter: P, out: W, version: &'a str, root: PathBuf) -> Self {
        Self {
            ctx,
            prompter,
            out,
            version,
            root,
        }
    }

    /// Loop until the user quits.
    ///
    /// Errors from an action are printed and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the top-level prompt or the output fails.
    pub fn run(&mut self) -> Result<()> {
        let labels: Vec<String> = MenuAction::ALL
            .iter()
            .map(|a| a.label().to_string())
            .collect();

        loop {
            let Some(idx) = self.prompter.select("dm", &labels)? else {
                return Ok(());
            };
            let action = MenuAction::ALL[idx];
            debug!(?action, "menu selection");
            if action == MenuAction::Quit {
                return Ok(());
            }
            if let Err(e) = self.dispatch(action) {
                writeln!(self.out, "error: {e}")?;
            }
        }
    }

    fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        let ctx = self.ctx;
        let config = ctx.config();
        match action {
            MenuAction::Jump => {
                let names: Vec<String> = config.jumps.keys().cloned().collect();
                if let Some(name) = self.pick("Jump to", "jumps", &names)? {
                    let entry = jump::resolve(config, name)?;
                    writeln!(self.out, "{}", entry.path.display())?;
                }
            }
            MenuAction::Alias => {
                let names: Vec<String> = config.aliases.keys().cloned().collect();
                if let Some(name) = self.pick("Alias", "aliases", &names)? {
                    let code = alias::run(config, name, &[])?;
                    self.report_exit(code)?;
                }
            }
            MenuAction::Project => {
                let names: Vec<String> = config.projects.keys().cloned().collect();
                let Some(name) = self.pick("Project", "projects", &names)? else {
                    return Ok(());
                };
                let (_, proj) = project::resolve(config, name)?;
                let actions: Vec<String> = proj.actions.keys().cloned().collect();
                if let Some(action) = self.pick("Action", "actions", &actions)? {
                    let code = project::run(config, name, action, &[])?;
                    self.report_exit(code)?;
                }
            }
            MenuAction::Plugin => {
                let dirs = config.plugin_dirs(ctx.home());
                let names: Vec<String> = plugin::discover(&dirs)?
                    .into_iter()
                    .map(|p| p.name)
                    .collect();
                if let Some(name) = self.pick("Plugin", "plugins", &names)? {
                    let code = plugin::run(&dirs, name, &[])?;
                    self.report_exit(code)?;
                }
            }
            MenuAction::Recent => {
                let within = self.prompter.input("Modified within", "7d")?;
                let hits = recent::recent(
                    &self.root,
                    parse_duration(&within)?,
                    config.search.max_results,
                    &config.search.exclude_dirs,
                )?;
                write_hits(&mut self.out, &self.root, &hits)?;
            }
            MenuAction::Find => {
                let pattern = self.prompter.input("Name (glob or text)", "")?;
                let hits = filesearch::search(&SearchOptions {
                    root: self.root.clone(),
                    pattern: Some(pattern).filter(|p| !p.is_empty()),
                    exclude_dirs: config.search.exclude_dirs.clone(),
                    limit: config.search.max_results,
                    ..SearchOptions::default()
                })?;
                write_hits(&mut self.out, &self.root, &hits)?;
            }
            MenuAction::Snapshot => {
                let snap = snapshot::capture(self.version);
                write!(self.out, "{}", snapshot::render_text(&snap))?;
            }
            MenuAction::Doctor => {
                let probe = UreqProbe::new();
                let env = |name: &str| env::var(name).ok();
                let report = Doctor {
                    home: ctx.home(),
                    probe: &probe,
                    env: &env,
                }
                .run(&Ok(config.clone()));
                write_report(&mut self.out, &report)?;
            }
            MenuAction::Quit => {}
        }
        Ok(())
    }

    /// Select from `names`, or say there is nothing to pick.
    fn pick<'n>(&mut self, prompt: &str, what: &str, names: &'n [String]) -> Result<Option<&'n str>> {
        if names.is_empty() {
            writeln!(self.out, "No {what} configured.")?;
            return Ok(None);
        }
        Ok(self
            .prompter
            .select(prompt, names)?
            .and_then(|i| names.get(i))
            .map(String::as_str))
    }

    fn report_exit(&mut self, code: i32) -> Result<()> {
        if code != 0 {
            writeln!(self.out, "exited with code {code}")?;
        }
        Ok(())
    }
}

/// Run the menu on the terminal.
///
/// # Errors
///
/// Returns an error if the terminal cannot be used.
pub fn run(ctx: &Context, version: &str) -> Result<()> {
    let root = root_or_cwd(None)?;
    Menu::new(ctx, TermPrompter::default(), io::stdout(), version, root).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LoadOptions};
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    enum Answer {
        Pick(usize),
        Text(&'static str),
        Back,
    }

    /// Replays canned answers; backs out once they run out.
    struct Scripted {
        answers: VecDeque<Answer>,
        prompts: Vec<String>,
    }

    impl Scripted {
        fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
                prompts: Vec::new(),
            }
        }
    }

    impl Prompter for Scripted {
        fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
            self.prompts.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Pick(i)) => {
                    assert!(i < items.len(), "pick {i} out of range for {prompt}");
                    Ok(Some(i))
                }
                Some(Answer::Text(t)) => panic!("expected a select for {prompt}, got text {t}"),
                Some(Answer::Back) | None => Ok(None),
            }
        }

        fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
            self.prompts.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Text(t)) => Ok(t.to_string()),
                _ => Ok(default.to_string()),
            }
        }
    }

    fn context(dir: &TempDir, json: serde_json::Value) -> Context {
        let config: Config = serde_json::from_value(json).unwrap();
        Context::with_config(
            config,
            LoadOptions {
                config_path: dir.path().join("config.json"),
                home: dir.path().join("home"),
                profile: None,
                use_cache: false,
            },
        )
    }

    fn position(action: MenuAction) -> usize {
        MenuAction::ALL.iter().position(|a| *a == action).unwrap()
    }

    fn drive(ctx: &Context, root: PathBuf, answers: Vec<Answer>) -> (String, Vec<String>) {
        let mut menu = Menu::new(ctx, Scripted::new(answers), Vec::new(), "test-version", root);
        menu.run().unwrap();
        (
            String::from_utf8(menu.out).unwrap(),
            menu.prompter.prompts,
        )
    }

    #[test]
    fn jump_prints_path() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        let ctx = context(&dir, serde_json::json!({ "jumps": { "docs": docs } }));

        let (out, _) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![
                Answer::Pick(position(MenuAction::Jump)),
                Answer::Pick(0),
                Answer::Pick(position(MenuAction::Quit)),
            ],
        );
        assert_eq!(out, format!("{}\n", docs.display()));
    }

    #[test]
    fn escape_returns_to_top() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, serde_json::json!({ "jumps": { "a": "/a", "b": "/b" } }));

        let (out, prompts) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![
                Answer::Pick(position(MenuAction::Jump)),
                Answer::Back,
                Answer::Pick(position(MenuAction::Quit)),
            ],
        );
        assert!(out.is_empty());
        assert_eq!(prompts, vec!["dm", "Jump to", "dm"]);
    }

    #[test]
    fn empty_section_says_so() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, serde_json::json!({}));

        let (out, _) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![Answer::Pick(position(MenuAction::Alias))],
        );
        assert_eq!(out, "No aliases configured.\n");
    }

    #[test]
    fn recent_lists_files_under_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fresh.txt"), "new").unwrap();
        let ctx = context(&dir, serde_json::json!({}));

        let (out, prompts) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![Answer::Pick(position(MenuAction::Recent)), Answer::Text("1d")],
        );
        assert!(out.contains("fresh.txt"));
        assert!(out.contains("1 file(s)"));
        assert_eq!(prompts[1], "Modified within");
    }

    #[test]
    fn action_errors_do_not_end_the_loop() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, serde_json::json!({}));

        let (out, prompts) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![
                Answer::Pick(position(MenuAction::Recent)),
                Answer::Text("soon"),
                Answer::Pick(position(MenuAction::Snapshot)),
            ],
        );
        assert!(out.starts_with("error: Invalid argument: invalid duration: soon\n"));
        assert!(out.contains("test-version"));
        assert_eq!(prompts.iter().filter(|p| *p == "dm").count(), 3);
    }

    #[test]
    fn find_filters_by_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();
        let ctx = context(&dir, serde_json::json!({}));

        let (out, _) = drive(
            &ctx,
            dir.path().to_path_buf(),
            vec![Answer::Pick(position(MenuAction::Find)), Answer::Text("*.md")],
        );
        assert!(out.contains("notes.md"));
        assert!(!out.contains("main.rs"));
    }
}
