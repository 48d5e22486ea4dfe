// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parser for the `shader/permutations` file.
//!
//! The file lists a source shader name on its own line, followed by one
//! `+ name: DEFINE DEFINE ...` line per permutation built from that source.
//! Lines starting with `#` are comments.

use std::collections::HashMap;

#[derive(Debug)]
pub struct Permutation {
    /// The new name for the permutation.
    pub name: String,
    /// Set of defines to apply for the permutation.
    pub defines: Vec<String>,
}

pub fn parse(source: &str) -> HashMap<String, Vec<Permutation>> {
    let mut map: HashMap<String, Vec<Permutation>> = HashMap::default();
    let mut current_source: Option<String> = None;
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(permutation) = line.strip_prefix('+') else {
            current_source = Some(line.to_string());
            continue;
        };
        let Some(source_name) = &current_source else {
            continue;
        };
        let (name, defines) = match permutation.split_once(':') {
            Some((name, defines)) => (
                name.trim(),
                defines.split_whitespace().map(str::to_string).collect(),
            ),
            None => (permutation.trim(), vec![]),
        };
        map.entry(source_name.clone())
            .or_default()
            .push(Permutation {
                name: name.to_string(),
                defines,
            });
    }
    map
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn parses_names_defines_and_comments() {
        let source = "# comment\nribbon\n+ ribbon: scene_transform\n+ ribbon_raw\n+ ribbon_capture: scene_transform capture\n";
        let map = parse(source);
        let permutations = &map["ribbon"];
        assert_eq!(permutations.len(), 3);
        assert_eq!(permutations[0].name, "ribbon");
        assert_eq!(permutations[0].defines, ["scene_transform"]);
        assert_eq!(permutations[1].name, "ribbon_raw");
        assert!(permutations[1].defines.is_empty());
        assert_eq!(
            permutations[2].defines,
            ["scene_transform", "capture"]
        );
    }
}
