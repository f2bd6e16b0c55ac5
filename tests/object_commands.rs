use grit::artifacts::objects::blob::Blob;
use grit::artifacts::objects::object::Object;
use predicates::prelude::predicate;

mod common;

#[test]
fn hash_object_dry_run_prints_hash_without_storing() {
    let repo = common::TestRepo::init();
    repo.write_file("note.txt", "dry run content\n");

    let expected = Blob::new(bytes::Bytes::from_static(b"dry run content\n"))
        .object_id()
        .unwrap();

    repo.cmd()
        .args(["hash-object", "note.txt"])
        .assert()
        .success()
        .stdout(predicate::eq(format!("{expected}\n")));

    assert!(!repo.database().contains(&expected));
}

#[test]
fn hash_object_write_then_cat_file_round_trips() {
    let repo = common::TestRepo::init();
    repo.write_file("note.txt", "persisted content\n");

    let output = repo
        .cmd()
        .args(["hash-object", "-w", "note.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let oid = String::from_utf8(output.stdout).unwrap().trim().to_string();

    repo.cmd()
        .args(["cat-file", "blob", &oid])
        .assert()
        .success()
        .stdout(predicate::eq("persisted content\n"));
}

#[test]
fn hash_is_independent_of_persistence() {
    let repo = common::TestRepo::init();
    repo.write_file("note.txt", "same bytes");

    let dry = repo
        .cmd()
        .args(["hash-object", "note.txt"])
        .output()
        .unwrap();
    let wet = repo
        .cmd()
        .args(["hash-object", "-w", "note.txt"])
        .output()
        .unwrap();

    assert_eq!(dry.stdout, wet.stdout);
}

#[test]
fn cat_file_resolves_head_to_the_commit_payload() {
    let repo = common::TestRepo::init();
    let blob = repo.store_blob(b"content");
    let tree = repo.store_tree(vec![(
        grit::artifacts::index::entry_mode::EntryMode::Regular,
        "file.txt",
        blob,
    )]);
    let commit = repo.store_commit(tree.clone(), vec![], "initial\n");
    repo.set_head_branch(&commit);

    repo.cmd()
        .args(["cat-file", "commit", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("tree {tree}")))
        .stdout(predicate::str::contains("initial"));
}

#[test]
fn cat_file_rejects_an_impossible_type() {
    let repo = common::TestRepo::init();
    let blob = repo.store_blob(b"just a blob");

    repo.cmd()
        .args(["cat-file", "commit", blob.as_ref()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected commit"));
}

#[test]
fn commands_outside_a_repository_fail() {
    let dir = assert_fs::TempDir::new().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("grit").unwrap();

    cmd.current_dir(dir.path())
        .args(["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no repository"));
}
