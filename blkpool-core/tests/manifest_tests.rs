use blkpool_core::{DomainClass, DomainManifest, PoolError, Result, VolumeOwner};

const MANIFEST: &str = r#"
- name: fedora
  class: template
  volumes:
    root:
      pool: default
      volume_type: origin
      size: 10485760
    private:
      pool: default
      volume_type: read-write
      size: 2097152
- name: work
  class: regular
  template: fedora
  volumes:
    root:
      pool: default
      volume_type: snapshot
    private:
      pool: default
      volume_type: read-write
      size: 1048576
- name: disp1
  class: disposable
  template: fedora
"#;

#[test]
fn test_resolve_with_template() -> Result<()> {
    let manifest = DomainManifest::from_yaml(MANIFEST)?;
    let work = manifest.resolve("work")?;

    assert_eq!(work.name(), "work");
    assert_eq!(work.class(), DomainClass::Regular);
    assert!(!work.is_template());

    let template = work.template().expect("work has a template");
    assert_eq!(template.name(), "fedora");
    assert!(template.is_template());
    assert_eq!(template.volume_config("root").and_then(|c| c.size), Some(10_485_760));

    let root = work.volume_config("root").expect("root volume");
    assert_eq!(root.name, "root");
    assert_eq!(root.volume_type.as_deref(), Some("snapshot"));
    assert_eq!(root.size, None);
    Ok(())
}

#[test]
fn test_disposable_without_volumes() -> Result<()> {
    let manifest = DomainManifest::from_yaml(MANIFEST)?;
    let disp = manifest.resolve("disp1")?;

    assert!(disp.is_disposable());
    assert_eq!(disp.volumes().count(), 0);
    assert_eq!(disp.template().map(|t| t.name()), Some("fedora"));
    Ok(())
}

#[test]
fn test_unknown_domain_and_template() -> Result<()> {
    let manifest = DomainManifest::from_yaml(MANIFEST)?;
    assert!(matches!(
        manifest.resolve("personal"),
        Err(PoolError::ConfigError(_))
    ));

    let broken = DomainManifest::from_yaml(
        "- name: work\n  class: regular\n  template: missing\n",
    )?;
    assert!(matches!(broken.resolve("work"), Err(PoolError::ConfigError(_))));
    Ok(())
}

#[test]
fn test_template_cycle_detected() -> Result<()> {
    let manifest = DomainManifest::from_yaml(
        "- name: a\n  class: regular\n  template: b\n- name: b\n  class: regular\n  template: a\n",
    )?;
    assert!(matches!(manifest.resolve("a"), Err(PoolError::ConfigError(_))));
    Ok(())
}

#[test]
fn test_duplicate_domain_rejected() {
    let result = DomainManifest::from_yaml(
        "- name: a\n  class: regular\n- name: a\n  class: template\n",
    );
    assert!(matches!(result, Err(PoolError::ConfigError(_))));
}

#[test]
fn test_load_missing_manifest() {
    let result = DomainManifest::load(std::path::Path::new("/nonexistent/blkpool/domains.yaml"));
    assert!(matches!(result, Err(PoolError::ConfigError(_))));
}

#[test]
fn test_names_sorted() -> Result<()> {
    let manifest = DomainManifest::from_yaml(MANIFEST)?;
    let names: Vec<_> = manifest.names().collect();
    assert_eq!(names, vec!["disp1", "fedora", "work"]);
    Ok(())
}

#[test]
fn test_resized_volume_survives_reload() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("domains.yaml");

    let mut manifest = DomainManifest::from_yaml(MANIFEST)?;
    manifest.set_volume_size("fedora", "root", 41_943_040)?;
    manifest.save_to(&path)?;

    let reloaded = DomainManifest::load(&path)?;
    let work = reloaded.resolve("work")?;
    let template = work.template().expect("work has a template");
    assert_eq!(
        template.volume_config("root").and_then(|c| c.size),
        Some(41_943_040)
    );
    assert_eq!(
        work.volume_config("private").and_then(|c| c.size),
        Some(1_048_576)
    );
    assert_eq!(work.volume_config("root").map(|c| c.name.as_str()), Some("root"));
    assert_eq!(reloaded.names().count(), 3);
    Ok(())
}

#[test]
fn test_set_size_of_unknown_volume() -> Result<()> {
    let mut manifest = DomainManifest::from_yaml(MANIFEST)?;
    assert!(matches!(
        manifest.set_volume_size("personal", "root", 1),
        Err(PoolError::ConfigError(_))
    ));
    assert!(matches!(
        manifest.set_volume_size("disp1", "root", 1),
        Err(PoolError::ConfigError(_))
    ));
    Ok(())
}
