use umgmt_core::{DbConfig, User, UserValidationError};

#[test]
fn user_new_sets_defaults() {
    let user = User::new("alice", 1000, 100);

    assert_eq!(user.name, "alice");
    assert_eq!(user.password, "x");
    assert_eq!(user.uid, 1000);
    assert_eq!(user.gid, 100);
    assert_eq!(user.gecos, "");
    assert_eq!(user.home, "/home/alice");
    assert_eq!(user.shell, "/bin/sh");
    assert!(user.validate().is_ok());
}

#[test]
fn builders_override_opaque_fields() {
    let user = User::new("svc", 990, 990)
        .with_password("!")
        .with_gecos("Service account")
        .with_home("/var/lib/svc")
        .with_shell("/usr/sbin/nologin");

    assert_eq!(user.password, "!");
    assert_eq!(user.gecos, "Service account");
    assert_eq!(user.home, "/var/lib/svc");
    assert_eq!(user.shell, "/usr/sbin/nologin");
}

#[test]
fn validate_rejects_bad_names() {
    assert_eq!(
        User::new("", 1000, 1000).validate().unwrap_err(),
        UserValidationError::EmptyName
    );
    assert_eq!(
        User::new("bad:name", 1000, 1000).validate().unwrap_err(),
        UserValidationError::InvalidName("bad:name".to_string())
    );
}

#[test]
fn validate_rejects_line_breaks_in_fields() {
    let err = User::new("alice", 1000, 1000)
        .with_home("/home/alice\nroot::0:0")
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        UserValidationError::ForbiddenCharacter { field: "home", .. }
    ));
}

#[test]
fn user_serialization_uses_field_names() {
    let user = User::new("alice", 1000, 1000).with_gecos("Alice");

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["name"], "alice");
    assert_eq!(json["uid"], 1000);
    assert_eq!(json["gid"], 1000);
    assert_eq!(json["gecos"], "Alice");

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}

#[test]
fn config_reads_login_defs_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login.defs");
    std::fs::write(&path, "UID_MIN\t\t 3000\nUID_MAX 3999\n").unwrap();

    let config = DbConfig::from_login_defs(&path).unwrap();
    assert_eq!(config.uid_range.min(), 3000);
    assert_eq!(config.uid_range.max(), 3999);
    assert_eq!(config.gid_range, DbConfig::default().gid_range);

    assert!(DbConfig::from_login_defs(dir.path().join("absent")).is_err());
}
