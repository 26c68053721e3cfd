//! Profile repository integration tests
//!
//! Round-trips, customization of built-ins, deletion and listing.

use claudeup_core::presentation::Section;
use claudeup_core::profile::{McpServer, Profile, ProfileRepository, SecretRef, SecretSource};
use claudeup_core::resolver::ScopeResolver;
use claudeup_core::{Category, ClaudeupPaths, ConfigStore, ProfileError};
use claudeup_host::{MarketplaceSource, Scope};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, ClaudeupPaths, ProfileRepository) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let paths = ClaudeupPaths::rooted(temp.path());
    let repo = ProfileRepository::new(paths.profiles_dir()).expect("Failed to load built-ins");
    (temp, paths, repo)
}

fn full_profile(name: &str) -> Profile {
    let mut profile = Profile::new(name);
    profile.description = "Everything declared".to_string();
    profile.marketplaces.push(MarketplaceSource::GitHub {
        repo: "acme/tools".to_string(),
    });
    profile
        .scope_mut(Scope::User)
        .plugins
        .insert("lint@tools".to_string());

    let mut server = McpServer::new("tracker", "npx");
    server.args = vec!["-y".to_string(), "tracker-mcp".to_string()];
    server.secrets.insert(
        "TRACKER_TOKEN".to_string(),
        SecretRef {
            description: "API token".to_string(),
            sources: vec![
                SecretSource {
                    kind: "env".to_string(),
                    key: "TRACKER_TOKEN".to_string(),
                },
                SecretSource {
                    kind: "1password".to_string(),
                    key: "op://dev/tracker/token".to_string(),
                },
            ],
        },
    );
    profile.scope_mut(Scope::Project).mcp_servers.push(server);
    profile
        .extensions
        .entry(Category::Rules)
        .or_default()
        .insert("style".to_string());
    profile
}

#[test]
fn test_save_then_get_round_trips() {
    let (_temp, _paths, repo) = setup();
    let profile = full_profile("team/full");

    repo.save(&profile).expect("Failed to save profile");
    let loaded = repo.get("team/full").expect("Failed to get profile");

    assert_eq!(loaded, profile);
}

#[test]
fn test_restore_removes_only_the_overlay() {
    let (_temp, _paths, repo) = setup();
    let original = repo.get("frontend").expect("Failed to get built-in");

    let mut custom = Profile::new("frontend");
    custom.description = "My frontend".to_string();
    repo.save(&custom).expect("Failed to customize");
    assert!(repo.is_customized("frontend"));
    assert_eq!(repo.get("frontend").unwrap().description, "My frontend");

    repo.restore("frontend").expect("Failed to restore");
    assert!(!repo.is_customized("frontend"));
    assert_eq!(repo.get("frontend").unwrap(), original);
}

#[test]
fn test_customized_builtin_listed_once_in_builtin_section() {
    let (_temp, _paths, repo) = setup();
    repo.save(&Profile::new("frontend")).unwrap();
    repo.save(&Profile::new("mine")).unwrap();

    let listing = repo.list(false).unwrap();
    let names = listing.names();
    assert_eq!(names.iter().filter(|n| **n == "frontend").count(), 1);

    let builtin = listing
        .sections
        .iter()
        .find(|s| s.section == Section::BuiltIn)
        .unwrap();
    let frontend = builtin
        .groups
        .iter()
        .flat_map(|g| &g.profiles)
        .find(|p| p.name == "frontend")
        .unwrap();
    assert!(frontend.customized);

    let user = listing
        .sections
        .iter()
        .find(|s| s.section == Section::User)
        .unwrap();
    let user_names: Vec<_> = user.groups.iter().flat_map(|g| &g.profiles).map(|p| p.name.as_str()).collect();
    assert_eq!(user_names, vec!["mine"]);
}

#[test]
fn test_hidden_profiles_filtered_from_listing() {
    let temp = TempDir::new().unwrap();
    let repo = ProfileRepository::with_builtins(temp.path().join("profiles"), Vec::new());
    for name in ["visible", "_secret1", "_secret2"] {
        repo.save(&Profile::new(name)).unwrap();
    }

    let listing = repo.list(false).unwrap();
    assert_eq!(listing.names(), vec!["visible"]);
    assert_eq!(listing.hidden_count, 2);
    assert!(listing.hidden_hint().unwrap().contains("2 hidden"));

    let all = repo.list(true).unwrap();
    assert_eq!(all.names().len(), 3);
    assert!(all.hidden_hint().is_none());
}

#[test]
fn test_builtin_groups_render_after_ungrouped() {
    let (_temp, _paths, repo) = setup();
    let listing = repo.list(false).unwrap();
    let builtin = &listing.sections[0];
    assert_eq!(builtin.section, Section::BuiltIn);
    assert_eq!(builtin.groups[0].prefix, None);
    assert_eq!(builtin.groups.last().unwrap().prefix.as_deref(), Some("languages"));
}

#[test]
fn test_delete_active_profile_clears_pointers() {
    let (temp, paths, repo) = setup();
    let project = temp.path().join("work").join("app");
    fs::create_dir_all(&project).unwrap();
    let mut store = ConfigStore::open(paths).unwrap();

    repo.save(&Profile::new("doomed")).unwrap();
    store.set_active(Scope::User, None, Some("doomed")).unwrap();
    store
        .set_active(Scope::Project, Some(&project), Some("doomed"))
        .unwrap();

    let cleared = repo.delete("doomed", &mut store, Some(&project)).unwrap();
    assert!(cleared.contains(&Scope::User));
    assert!(cleared.contains(&Scope::Project));

    let active = ScopeResolver::new(&store).resolve_active(&project).unwrap();
    assert_eq!(active.user, None);
    assert_eq!(active.project, None);
    assert!(matches!(repo.get("doomed"), Err(ProfileError::NotFound(_))));
}

#[test]
fn test_legacy_profile_file_is_normalized() {
    let (_temp, paths, repo) = setup();
    fs::create_dir_all(paths.profiles_dir()).unwrap();
    fs::write(
        paths.profiles_dir().join("legacy.json"),
        r#"{"name": "legacy", "plugins": ["a@m"], "mcpServers": [{"name": "s", "command": "c", "scope": "local"}]}"#,
    )
    .unwrap();

    let profile = repo.get("legacy").unwrap();
    assert!(profile.scope(Scope::User).unwrap().plugins.contains("a@m"));
    assert!(profile.scope(Scope::User).unwrap().mcp_servers.is_empty());
    assert_eq!(profile.scope(Scope::Local).unwrap().mcp_servers.len(), 1);
}
