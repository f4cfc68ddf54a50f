//! End-to-end tests for `server-package init`.

mod common;

use common::{PackageFixture, APP_LATEST, STATE_LATEST};

#[test]
fn init_installs_scaffold_into_package_sources() {
    let package = PackageFixture::new("mailer").expect("fixture");

    let result = package.run(&["init"]).expect("run init");

    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert_eq!(package.read_source("state.swift").expect("state"), STATE_LATEST);
    assert_eq!(package.read_source("app.swift").expect("app"), APP_LATEST);
    for rel in [
        "routes.swift",
        "objects/model/model.swift",
        "objects/operation/operation.swift",
    ] {
        assert!(package.source_dir().join(rel).is_file(), "missing {rel}");
    }
    assert!(result
        .stdout
        .contains("mailer: 5 of 5 scaffold files written to Sources/mailer"));
    let routes = package.read_source("routes.swift").expect("routes");
    assert!(routes.starts_with("// import Foundation\nimport Server\n"));
    assert!(routes.contains("// post(\"encrypt\") { request in"));

    let update = package
        .run(&["update-defaults", "--dry-run"])
        .expect("run update-defaults");
    assert!(update.stdout.contains("Already up to date: state.swift (v3)"));
    assert!(update.stdout.contains("Already up to date: app.swift (v4)"));
}

#[test]
fn init_keeps_existing_files_unless_forced() {
    let package = PackageFixture::new("mailer").expect("fixture");
    package
        .write_source("routes.swift", "// my routes\n")
        .expect("seed routes");

    let result = package.run(&["init"]).expect("run init");
    assert!(result.status.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("routes.swift already exists; keeping it"));
    assert_eq!(
        package.read_source("routes.swift").expect("routes"),
        "// my routes\n"
    );

    let forced = package.run(&["init", "--force"]).expect("run init --force");
    assert!(forced.status.success(), "stderr: {}", forced.stderr);
    assert_ne!(
        package.read_source("routes.swift").expect("routes"),
        "// my routes\n"
    );
    assert!(package
        .backups()
        .expect("backups")
        .contains(&"server-defaults_routes.swift_previous_version.bak".to_string()));
}

#[test]
fn init_requires_package_manifest() {
    let package = PackageFixture::new("mailer").expect("fixture");
    std::fs::remove_file(package.root().join("Package.swift")).expect("remove manifest");

    let result = package.run(&["init"]).expect("run init");

    assert!(!result.status.success());
    assert!(result.stderr.contains("Package.swift not found"), "stderr: {}", result.stderr);
    assert!(!package.source_dir().join("state.swift").exists());
}
