use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

const EXPECTED_STUDENTS: [&str; 13] = [
    "Ryan Albright",
    "Grace Bishara",
    "Colin Chu",
    "Penelope Chung",
    "Aurelia Freifeld",
    "Joshua Gould",
    "Ravi Kumar",
    "Meera Nanjapa",
    "Kota Newman",
    "Liam Percer",
    "Tate Rosenberger",
    "Deniz Soral",
    "Andromeda Wen",
];

fn fixture_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(rel)
}

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_quickaddd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn quickaddd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn string_list(v: &serde_json::Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| s.as_str().map(|s| s.to_string()))
        .collect()
}

#[test]
fn messy_paste_fills_roster_then_clear_empties_it() {
    let workspace = temp_dir("quickadd-roster-workflow");
    let paste = std::fs::read_to_string(fixture_path("messy_paste.txt")).expect("read fixture");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({ "name": "Modern Physics", "block": "Block 5" }),
    );
    let class_id = created
        .get("classId")
        .and_then(|v| v.as_str())
        .expect("classId")
        .to_string();

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.list",
        json!({ "classId": class_id }),
    );
    assert_eq!(listed.get("count").and_then(|v| v.as_u64()), Some(0));

    let bulk = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.addBulk",
        json!({ "classId": class_id, "text": paste }),
    );
    assert_eq!(bulk.get("added").and_then(|v| v.as_u64()), Some(13));
    assert_eq!(string_list(&bulk, "parsed"), EXPECTED_STUDENTS);

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.list",
        json!({ "classId": class_id }),
    );
    let roster = string_list(&listed, "students");
    assert_eq!(roster, EXPECTED_STUDENTS);
    assert!(!roster.iter().any(|n| n == "Wesley Chao"));
    assert!(!roster.iter().any(|n| n.contains("CS350")));
    assert!(!roster.iter().any(|n| n == "Student" || n == "Teacher"));

    // Pasting the same block again adds nothing.
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.addBulk",
        json!({ "classId": class_id, "text": paste }),
    );
    assert_eq!(again.get("added").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(again.get("count").and_then(|v| v.as_u64()), Some(13));

    let all = request_ok(&mut stdin, &mut reader, "7", "students.all", json!({}));
    assert_eq!(string_list(&all, "students").len(), 13);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7n",
        "notes.create",
        json!({
            "classId": class_id,
            "students": ["Ravi Kumar", "Deniz Soral"],
            "note": "lab write-up missing"
        }),
    );

    let cleared = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.clear",
        json!({ "classId": class_id }),
    );
    assert_eq!(cleared.get("removed").and_then(|v| v.as_u64()), Some(13));
    let cleared_again = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.clear",
        json!({ "classId": class_id }),
    );
    assert_eq!(cleared_again.get("removed").and_then(|v| v.as_u64()), Some(0));

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.list",
        json!({ "classId": class_id }),
    );
    assert!(string_list(&listed, "students").is_empty());

    // Clearing a roster leaves the global list and the class notes alone.
    let all = request_ok(&mut stdin, &mut reader, "11", "students.all", json!({}));
    assert_eq!(string_list(&all, "students").len(), 13);

    let notes = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "notes.list",
        json!({ "classId": class_id }),
    );
    assert_eq!(notes.get("total").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        notes.pointer("/notes/0/note").and_then(|v| v.as_str()),
        Some("lab write-up missing")
    );
    assert_eq!(
        notes.pointer("/notes/0/students"),
        Some(&json!(["Ravi Kumar", "Deniz Soral"]))
    );

    let classes = request_ok(&mut stdin, &mut reader, "13", "classes.list", json!({}));
    assert_eq!(
        classes.pointer("/classes/0/noteCount").and_then(|v| v.as_u64()),
        Some(1)
    );
    assert_eq!(
        classes.pointer("/classes/0/studentCount").and_then(|v| v.as_u64()),
        Some(0)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn roster_survives_restart() {
    let workspace = temp_dir("quickadd-roster-restart");

    let class_id = {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
        let created = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "classes.create",
            json!({ "name": "Intro Physics", "block": "Block 4" }),
        );
        let class_id = created
            .get("classId")
            .and_then(|v| v.as_str())
            .expect("classId")
            .to_string();
        for (i, name) in ["Alice", " Bob ", "Alice", ""].iter().enumerate() {
            let _ = request_ok(
                &mut stdin,
                &mut reader,
                &format!("add-{i}"),
                "students.add",
                json!({ "classId": class_id, "name": name }),
            );
        }
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "3",
            "students.remove",
            json!({ "classId": class_id, "name": "Alice" }),
        );
        drop(stdin);
        let _ = child.wait();
        class_id
    };

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.list",
        json!({ "classId": class_id }),
    );
    assert_eq!(string_list(&listed, "students"), vec!["Bob"]);
    let all = request_ok(&mut stdin, &mut reader, "3", "students.all", json!({}));
    assert_eq!(string_list(&all, "students"), vec!["Alice", "Bob"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
