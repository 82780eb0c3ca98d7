use std::io::Write;

use crate::util::text::{format_vector, truncate};

const INDENT: &str = "   ";

const TABLE_WIDTH: usize = 72;
const KEY_WIDTH: usize = 22;

/// Two-column table; `headers` names the key and value columns.
pub fn print_kv_table(
    out: &mut impl Write,
    title: &str,
    headers: (&str, &str),
    rows: &[(String, String)],
) {
    // "│ " + key + " │ " + value + " │"
    let val_w = TABLE_WIDTH.saturating_sub(KEY_WIDTH + 7);
    let k_line = "─".repeat(KEY_WIDTH + 2);
    let v_line = "─".repeat(val_w + 2);

    let _ = writeln!(out, "{INDENT}┌─ {} ─┐", truncate(title, TABLE_WIDTH - 6));
    let _ = writeln!(out, "{INDENT}┌{k_line}┬{v_line}┐");
    let _ = writeln!(
        out,
        "{INDENT}│ {:<KEY_WIDTH$} │ {:<val_w$} │",
        headers.0, headers.1
    );
    let _ = writeln!(out, "{INDENT}├{k_line}┼{v_line}┤");

    if rows.is_empty() {
        let _ = writeln!(out, "{INDENT}│ {:<KEY_WIDTH$} │ {:<val_w$} │", "(none)", "");
    }
    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<KEY_WIDTH$} │ {:<val_w$} │",
            truncate(key, KEY_WIDTH),
            truncate(val, val_w)
        );
    }

    let _ = writeln!(out, "{INDENT}└{k_line}┴{v_line}┘");
    let _ = writeln!(out);
}

/// Lists the first `limit` vectors of a per-atom array, one row per atom.
pub fn print_vector_table(out: &mut impl Write, title: &str, vectors: &[[f64; 3]], limit: usize) {
    if limit == 0 || vectors.is_empty() {
        return;
    }

    let shown = limit.min(vectors.len());
    let rows: Vec<(String, String)> = vectors[..shown]
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("{}", i + 1), format_vector(v, 6)))
        .collect();

    let title = if shown < vectors.len() {
        format!("{title} (first {shown} of {})", vectors.len())
    } else {
        title.to_string()
    };
    print_kv_table(out, &title, ("Atom", "x y z"), &rows);
}
