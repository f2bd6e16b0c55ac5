use predicates::prelude::predicate;

mod common;

#[test]
fn cat_index_prints_entries_in_path_order() {
    let repo = common::TestRepo::init();
    repo.write_file("b.txt", "bee\n");
    repo.write_file("a.txt", "ay\n");
    let b_entry = repo.tracked_entry("b.txt");
    let a_entry = repo.tracked_entry("a.txt");
    let a_oid = a_entry.oid.clone();
    let b_oid = b_entry.oid.clone();
    repo.write_index(&[b_entry, a_entry]);

    repo.cmd()
        .arg("cat-index")
        .assert()
        .success()
        .stdout(predicate::eq(format!(
            "100644 {a_oid} 0\ta.txt\n100644 {b_oid} 0\tb.txt\n"
        )));
}

#[test]
fn cat_index_on_a_missing_index_prints_nothing() {
    let repo = common::TestRepo::init();

    repo.cmd()
        .arg("cat-index")
        .assert()
        .success()
        .stdout(predicate::eq(""));
}

#[test]
fn a_tampered_index_is_rejected() {
    let repo = common::TestRepo::init();
    repo.write_file("tracked.txt", "content\n");
    repo.write_index(&[repo.tracked_entry("tracked.txt")]);

    let index_path = repo.root().join(".git/index");
    let mut bytes = std::fs::read(&index_path).unwrap();
    bytes[20] ^= 0xff;
    std::fs::write(&index_path, bytes).unwrap();

    repo.cmd()
        .arg("cat-index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt index"));
}
