// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A line-oriented preprocessor for the shader sources.
//!
//! Supported directives, each as the first non-whitespace item on its line:
//! `#ifdef NAME`, `#ifndef NAME`, `#else`, `#endif` and `#import name`,
//! where imports resolve against the `.wgsl` files in `shader/shared/`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Read every import available to the shaders in `shader_dir`.
pub fn get_imports(shader_dir: &Path) -> Result<HashMap<String, String>, std::io::Error> {
    let mut imports = HashMap::new();
    let imports_dir = shader_dir.join("shared");
    for entry in imports_dir.read_dir()? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(import_name) = file_name
            .to_str()
            .and_then(|name| name.strip_suffix(".wgsl"))
        else {
            continue;
        };
        let contents = fs::read_to_string(imports_dir.join(&file_name))?;
        imports.insert(import_name.to_owned(), contents);
    }
    Ok(imports)
}

struct Branch {
    live: bool,
    else_seen: bool,
}

pub fn preprocess(
    input: &str,
    shader_name: &str,
    defines: &HashSet<String>,
    imports: &HashMap<String, String>,
) -> String {
    let mut output = String::with_capacity(input.len());
    let mut stack: Vec<Branch> = vec![];
    for (line_number, line) in input.lines().enumerate() {
        let Some(directive_line) = line.trim_start().strip_prefix('#') else {
            if stack.iter().all(|branch| branch.live) {
                output.push_str(line);
                output.push('\n');
            }
            continue;
        };
        let (directive, argument) = split_directive(directive_line);
        match directive {
            def_test @ ("ifdef" | "ifndef") => {
                let want = def_test == "ifdef";
                stack.push(Branch {
                    live: defines.contains(argument) == want,
                    else_seen: false,
                });
            }
            "else" => match stack.last_mut() {
                Some(branch) if !branch.else_seen => {
                    branch.else_seen = true;
                    branch.live = !branch.live;
                }
                _ => log::warn!(
                    "unmatched #else (line {line_number} of {shader_name}.wgsl); ignoring"
                ),
            },
            "endif" => {
                if stack.pop().is_none() {
                    log::warn!("unmatched #endif (line {line_number} of {shader_name}.wgsl)");
                }
            }
            "import" => {
                if stack.iter().all(|branch| branch.live) {
                    if let Some(source) = imports.get(argument) {
                        output.push_str(&preprocess(source, shader_name, defines, imports));
                    } else {
                        log::warn!(
                            "unknown import `{argument}` (line {line_number} of {shader_name}.wgsl)"
                        );
                    }
                }
            }
            unknown => {
                log::warn!(
                    "unknown directive `#{unknown}` (line {line_number} of {shader_name}.wgsl)"
                );
            }
        }
    }
    if !stack.is_empty() {
        log::warn!("unterminated #ifdef/#ifndef in {shader_name}.wgsl");
    }
    output
}

fn split_directive(line: &str) -> (&str, &str) {
    match line.find(|c: char| !c.is_alphanumeric()) {
        Some(end) => (&line[..end], line[end..].trim()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, defines: &[&str]) -> String {
        let defines = defines.iter().map(|s| s.to_string()).collect();
        preprocess(input, "test", &defines, &HashMap::new())
    }

    #[test]
    fn ifdef_keeps_and_drops_branches() {
        let input = "a\n#ifdef x\nb\n#else\nc\n#endif\nd\n";
        assert_eq!(run(input, &["x"]), "a\nb\nd\n");
        assert_eq!(run(input, &[]), "a\nc\nd\n");
    }

    #[test]
    fn imports_expand_inline() {
        let mut imports = HashMap::new();
        imports.insert("common".to_string(), "shared line\n".to_string());
        let output = preprocess("#import common\nbody\n", "test", &HashSet::new(), &imports);
        assert_eq!(output, "shared line\nbody\n");
    }

    #[test]
    fn nested_conditions_require_all_branches_live() {
        let input = "#ifdef x\n#ifdef y\nboth\n#endif\nouter\n#endif\n";
        assert_eq!(run(input, &["x", "y"]), "both\nouter\n");
        assert_eq!(run(input, &["x"]), "outer\n");
        assert_eq!(run(input, &["y"]), "");
    }
}
