use std::fs;
use std::path::{Path, PathBuf};

struct SqlLiteral {
    file: PathBuf,
    line: usize,
    sql: String,
}

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

/// Reads the first string argument of a `sqlx::query*(` call, raw or plain.
fn literal_after(content: &str, call_idx: usize) -> Option<(usize, String)> {
    let open = call_idx + content[call_idx..].find('(')? + 1;
    let rest = content[open..].trim_start();
    let start = content.len() - rest.len();

    if let Some(raw) = rest.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let body = raw[hashes..].strip_prefix('"')?;
        let terminator = format!("\"{}", "#".repeat(hashes));
        let end = body.find(&terminator)?;
        return Some((start, body[..end].to_string()));
    }

    let body = rest.strip_prefix('"')?;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some((start, body[..i].to_string())),
            _ => {}
        }
    }
    None
}

fn repository_sql() -> Vec<SqlLiteral> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut files = Vec::new();
    collect_rs_files(&root, &mut files);

    let mut literals = Vec::new();
    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let mut pos = 0usize;
        while let Some(rel) = content[pos..].find("sqlx::query") {
            let idx = pos + rel;
            if let Some((byte_idx, sql)) = literal_after(&content, idx) {
                let line = content[..byte_idx].bytes().filter(|b| *b == b'\n').count() + 1;
                literals.push(SqlLiteral {
                    file: file.clone(),
                    line,
                    sql,
                });
            }
            pos = idx + "sqlx::query".len();
        }
    }
    literals
}

fn report(violations: &[&SqlLiteral], what: &str) -> String {
    violations
        .iter()
        .map(|v| format!("{}:{} {}", v.file.display(), v.line, what))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn guard_finds_repository_queries() {
    assert!(repository_sql().len() > 20);
}

#[test]
fn queries_use_postgres_placeholders() {
    let literals = repository_sql();
    let violations: Vec<_> = literals.iter().filter(|l| l.sql.contains('?')).collect();
    assert!(
        violations.is_empty(),
        "Found SQLite placeholders:\n{}",
        report(&violations, "uses '?' placeholder")
    );
}

#[test]
fn queries_avoid_sqlite_only_syntax() {
    let literals = repository_sql();
    let violations: Vec<_> = literals
        .iter()
        .filter(|l| {
            let lower = l.sql.to_lowercase();
            lower.contains("insert or ignore")
                || lower.contains("insert or replace")
                || lower.contains("strftime(")
                || lower.contains("datetime(")
        })
        .collect();
    assert!(
        violations.is_empty(),
        "Found SQLite-specific SQL:\n{}",
        report(&violations, "uses SQLite-only syntax")
    );
}

#[test]
fn every_update_and_delete_is_scoped() {
    let literals = repository_sql();
    let violations: Vec<_> = literals
        .iter()
        .filter(|l| {
            let lower = l.sql.to_lowercase();
            let trimmed = lower.trim_start();
            (trimmed.starts_with("update") || trimmed.starts_with("delete"))
                && !lower.contains(" where ")
        })
        .collect();
    assert!(
        violations.is_empty(),
        "Found blanket UPDATE/DELETE statements:\n{}",
        report(&violations, "has no WHERE clause")
    );
}

#[test]
fn active_flag_is_only_cleared_under_table_lock() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut files = Vec::new();
    collect_rs_files(&root, &mut files);

    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        if let Some(clear) = content.find("SET active = FALSE") {
            let lock = content[..clear].rfind("LOCK TABLE");
            assert!(
                lock.is_some(),
                "{} clears an active flag without locking the table first",
                file.display()
            );
        }
    }
}
