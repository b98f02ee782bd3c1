use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use umgmt_core::{
    AccountStore, DbError, MemoryAccountStore, PasswdFile, StoreError, User, UserDb,
    UserValidationError,
};

const SAMPLE: &str = "root:x:0:0:root:/root:/bin/bash\n\
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
alice:x:1000:1000:Alice Example,,,:/home/alice:/bin/zsh\n";

#[test]
fn store_then_load_reproduces_record_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = PasswdFile::new(dir.path().join("passwd"));

    let mut db = UserDb::new();
    db.add_user(User::new("alice", 1000, 1000).with_gecos("Alice")).unwrap();
    db.add_user(User::new("bob", 1001, 1000).with_shell("/bin/bash")).unwrap();
    db.add_user(User::new("carol", 1002, 1002).with_home("/srv/carol")).unwrap();
    db.store_to(&store).unwrap();

    let mut reloaded = UserDb::new();
    reloaded.load_from(&store).unwrap();

    assert_eq!(reloaded.users(), db.users());
}

#[test]
fn load_keeps_file_order_and_opaque_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, SAMPLE).unwrap();

    let mut db = UserDb::new();
    db.load_from(&PasswdFile::new(&path)).unwrap();

    let names: Vec<&str> = db.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, vec!["root", "daemon", "alice"]);
    let alice = db.get_user("alice").unwrap();
    assert_eq!(alice.gecos, "Alice Example,,,");
    assert_eq!(alice.shell, "/bin/zsh");

    db.store_to(&PasswdFile::new(&path)).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = UserDb::new();

    let err = db
        .load_from(&PasswdFile::new(dir.path().join("absent")))
        .unwrap_err();

    assert!(matches!(err, DbError::Store(StoreError::Io { .. })));
}

#[test]
fn malformed_file_is_a_format_error_and_keeps_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, "root:x:0:0:root:/root:/bin/bash\nbad line\n").unwrap();

    let mut db = UserDb::new();
    db.add_user(User::new("alice", 1000, 1000)).unwrap();
    let err = db.load_from(&PasswdFile::new(&path)).unwrap_err();

    assert!(matches!(err, DbError::Store(StoreError::Format { line: 2, .. })));
    assert!(db.get_user("alice").is_some());
}

#[test]
fn unwritable_destination_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = PasswdFile::new(dir.path().join("missing-dir").join("passwd"));

    let err = UserDb::new().store_to(&store).unwrap_err();
    assert!(matches!(err, DbError::Store(StoreError::Io { .. })));
}

#[test]
fn rewrite_replaces_file_and_keeps_permissions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, SAMPLE).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    let store = PasswdFile::new(&path);

    let mut db = UserDb::new();
    db.load_from(&store).unwrap();
    db.delete_user("daemon").unwrap();
    db.store_to(&store).unwrap();

    let reread = store.read_accounts().unwrap();
    assert_eq!(reread.len(), 2);
    assert!(reread.iter().all(|user| user.name != "daemon"));
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);

    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn new_file_gets_default_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");

    PasswdFile::new(&path)
        .write_accounts(&[User::new("alice", 1000, 1000)])
        .unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn store_rejects_records_that_would_corrupt_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, SAMPLE).unwrap();

    let source = MemoryAccountStore::with_users(vec![
        User::new("root", 0, 0),
        User::new("alice", 1000, 1000).with_gecos("x\nevil::0:0::/root:/bin/sh"),
    ]);
    let mut db = UserDb::new();
    db.load_from(&source).unwrap();

    let err = db.store_to(&PasswdFile::new(&path)).unwrap_err();

    match err {
        DbError::Store(StoreError::InvalidRecord { name, source }) => {
            assert_eq!(name, "alice");
            assert!(matches!(
                source,
                UserValidationError::ForbiddenCharacter { field: "gecos", .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn store_accepts_loaded_names_outside_login_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    let text = "Build Agent:x:990:990::/var/lib/build:/usr/sbin/nologin\n";
    fs::write(&path, text).unwrap();
    let store = PasswdFile::new(&path);

    let mut db = UserDb::new();
    db.load_from(&store).unwrap();
    db.store_to(&store).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn signed_uid_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, "alice:x:+1000:1000::/home/alice:/bin/sh\n").unwrap();

    let err = UserDb::new()
        .load_from(&PasswdFile::new(&path))
        .unwrap_err();
    assert!(matches!(err, DbError::Store(StoreError::Format { line: 1, .. })));
}

#[test]
fn rewrite_keeps_owner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passwd");
    fs::write(&path, SAMPLE).unwrap();
    let before = fs::metadata(&path).unwrap();
    let store = PasswdFile::new(&path);

    let mut db = UserDb::new();
    db.load_from(&store).unwrap();
    db.store_to(&store).unwrap();

    let after = fs::metadata(&path).unwrap();
    assert_eq!((after.uid(), after.gid()), (before.uid(), before.gid()));
    assert_ne!(after.ino(), before.ino());
}
