//! Integration tests: layered config driving the launcher and tools.

use chrono::{Local, TimeZone};
use dm::config::{self, LoadOptions};
use dm::doctor::{Doctor, HttpProbe, Status};
use dm::launcher::{jump, pack};
use dm::tools::{backup, renamer};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A dm home with a base config, one include, one pack and two profiles.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("work/site")).unwrap();
    fs::create_dir_all(root.join("home-notes")).unwrap();
    fs::create_dir_all(root.join("work-notes")).unwrap();

    write_json(
        &root.join("home/packs/git/pack.json"),
        &json!({
            "description": "Git helpers",
            "defaults": {
                "aliases": { "gs": "git status", "gl": "git log --oneline" },
                "search": { "max_results": 50 }
            }
        }),
    );
    fs::create_dir_all(root.join("home/packs/git/knowledge")).unwrap();
    fs::write(
        root.join("home/packs/git/knowledge/rebase.md"),
        "# Rebase\n\nUse `git rebase -i` to squash.\n",
    )
    .unwrap();

    write_json(
        &root.join("home/config.json"),
        &json!({
            "include": ["conf.d/*.json"],
            "packs": { "enabled": ["git"] },
            "jumps": { "notes": root.join("home-notes") },
            "aliases": { "gl": null },
            "profiles": {
                "work": { "jumps": { "notes": root.join("work-notes") } }
            }
        }),
    );
    write_json(
        &root.join("home/conf.d/10-projects.json"),
        &json!({
            "projects": {
                "site": {
                    "path": root.join("work/site"),
                    "actions": { "build": "echo built > out.txt", "fail": "exit 3" }
                }
            }
        }),
    );
    dir
}

fn options(dir: &TempDir, profile: Option<&str>) -> LoadOptions {
    LoadOptions {
        config_path: dir.path().join("home/config.json"),
        home: dir.path().join("home"),
        profile: profile.map(str::to_string),
        use_cache: true,
    }
}

#[test]
fn layers_merge_in_order() {
    let dir = workspace();
    let loaded = config::load(&options(&dir, None)).unwrap();
    let cfg = &loaded.config;

    // Pack default kept, removed by base via null, pack search default applied
    assert!(cfg.aliases.contains_key("gs"));
    assert!(!cfg.aliases.contains_key("gl"));
    assert_eq!(cfg.search.max_results, 50);
    // Include merged on top of the base
    assert!(cfg.projects.contains_key("site"));

    let notes = jump::resolve(cfg, "no").unwrap();
    assert!(notes.path.ends_with("home-notes"));
}

#[test]
fn profile_overrides_jump() {
    let dir = workspace();
    let loaded = config::load(&options(&dir, Some("work"))).unwrap();
    assert_eq!(loaded.config.profile.as_deref(), Some("work"));

    let notes = jump::resolve(&loaded.config, "notes").unwrap();
    assert!(notes.path.ends_with("work-notes"));
}

#[test]
fn unknown_profile_is_an_error() {
    let dir = workspace();
    let err = config::load(&options(&dir, Some("play"))).unwrap_err();
    assert!(err.to_string().contains("unknown profile: play"));
}

#[test]
fn cache_is_reused_until_includes_change() {
    let dir = workspace();
    let opts = options(&dir, None);

    assert!(!config::load(&opts).unwrap().from_cache);
    assert!(opts.cache_path().exists());
    assert!(config::load(&opts).unwrap().from_cache);

    // A new file matching the include glob invalidates the cache
    write_json(
        &dir.path().join("home/conf.d/20-extra.json"),
        &json!({ "jumps": { "extra": dir.path() } }),
    );
    let reloaded = config::load(&opts).unwrap();
    assert!(!reloaded.from_cache);
    assert!(reloaded.config.jumps.contains_key("extra"));

    // A different profile never reads another profile's cache
    let work = config::load(&options(&dir, Some("work"))).unwrap();
    assert!(!work.from_cache);
}

#[cfg(unix)]
#[test]
fn project_actions_run_in_project_root() {
    let dir = workspace();
    let cfg = config::load(&options(&dir, None)).unwrap().config;

    let code = dm::launcher::project::run(&cfg, "si", "bu", &[]).unwrap();
    assert_eq!(code, 0);
    let out = fs::read_to_string(dir.path().join("work/site/out.txt")).unwrap();
    assert_eq!(out.trim(), "built");

    let code = dm::launcher::project::run(&cfg, "site", "fail", &[]).unwrap();
    assert_eq!(code, 3);
}

#[test]
fn enabled_pack_knowledge_is_searchable() {
    let dir = workspace();
    let cfg = config::load(&options(&dir, None)).unwrap().config;
    let home = dir.path().join("home");

    let packs = pack::list(&cfg.packs_dir(&home), &cfg.packs.enabled).unwrap();
    let enabled: Vec<&pack::Pack> = packs.iter().filter(|p| p.enabled).collect();
    let hits = pack::search(&enabled, "SQUASH").unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(
        format!("{}/{}:{}", hits[0].pack, hits[0].doc, hits[0].line),
        "git/rebase:3"
    );
}

#[test]
fn rename_then_backup() {
    let dir = TempDir::new().unwrap();
    let photos = dir.path().join("photos");
    fs::create_dir(&photos).unwrap();
    for name in ["IMG_001.jpg", "IMG_002.jpg", "notes.txt"] {
        fs::write(photos.join(name), name).unwrap();
    }

    let plan = renamer::plan(&renamer::RenameOptions {
        dir: photos.clone(),
        find: r"^IMG_(\d+)".to_string(),
        replace: "holiday-$1".to_string(),
        regex: true,
        ..renamer::RenameOptions::default()
    })
    .unwrap();
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.conflicts(), 0);
    assert_eq!(renamer::apply(&plan).unwrap(), 2);
    assert!(photos.join("holiday-001.jpg").exists());
    assert!(!photos.join("IMG_002.jpg").exists());

    let at = Local.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
    let report = backup::create(&photos, &dir.path().join("backups"), &[], at).unwrap();
    assert_eq!(report.files, 3);
    assert!(report.archive.ends_with("photos-20260701-120000.zip"));
}

struct Offline;

impl HttpProbe for Offline {
    fn get(&self, _url: &str) -> Result<u16, String> {
        Err("offline".to_string())
    }
}

#[test]
fn doctor_on_loaded_config() {
    let dir = workspace();
    let loaded = config::load(&options(&dir, None)).map(|l| l.config);
    let env = |_: &str| -> Option<String> { None };

    let report = Doctor {
        home: &dir.path().join("home"),
        probe: &Offline,
        env: &env,
    }
    .run(&loaded);

    let status = |name: &str| {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.status)
    };
    assert_eq!(status("config"), Some(Status::Ok));
    assert_eq!(status("jump notes"), Some(Status::Ok));
    assert_eq!(status("project site"), Some(Status::Ok));
    assert_eq!(status("pack git"), Some(Status::Ok));
    assert_eq!(status("agent"), Some(Status::Warn));
    assert!(!report.has_failures());
}
