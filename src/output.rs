//! Format directory listings and folder trees as text.

use crate::index::path;
use crate::types::{DirectoryContents, FolderNode};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline. Respects NO_COLOR and TTY.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format one directory's contents as human-readable text.
pub fn format_directory_listing_text(dir_path: &str, contents: &DirectoryContents) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&path::to_absolute(&path::normalize(dir_path)))
    ));

    if contents.directories.is_empty() && contents.files.is_empty() {
        out.push_str("Directory is empty.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Type", "Size", "Uploaded", "Tag"]);
    for dir in &contents.directories {
        table.add_row(vec![
            format!("{}/", dir.name),
            "dir".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]);
    }
    for file in &contents.files {
        let name = path::basename(&file.path).unwrap_or(&file.path);
        table.add_row(vec![
            name.to_string(),
            "file".to_string(),
            format_file_size(file.size),
            file.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            file.entity_tag.clone(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!(
        "Total: {} directories, {} files.\n",
        contents.directories.len(),
        contents.files.len()
    ));
    out
}

/// Format the directory skeleton as an indented tree.
pub fn format_folder_tree_text(root: &FolderNode) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Folders")));
    out.push_str("/\n");
    for child in &root.children {
        render_folder(child, 1, &mut out);
    }
    if root.children.is_empty() {
        out.push_str("\nNo folders.\n");
    }
    out
}

fn render_folder(node: &FolderNode, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{}/\n", "  ".repeat(depth), node.name));
    for child in &node.children {
        render_folder(child, depth + 1, out);
    }
}

/// Human-readable byte count, e.g. `2.4 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exp = (bytes as f64).log(1024.0).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    if exp == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", bytes as f64 / 1024f64.powi(exp as i32), UNITS[exp])
    }
}
