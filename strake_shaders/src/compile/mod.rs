// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parsing, validation and reflection of the WGSL shader permutations.
//!
//! This runs from the build script to generate [`SHADERS`](crate::SHADERS),
//! and can also be used at runtime (behind the `compile` feature) to rebuild
//! shaders from disk, e.g. for hot reloading during development.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use naga::front::wgsl;
use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{AddressSpace, Module, ShaderStage, StorageAccess};
use thiserror::Error;

pub mod permutations;
pub mod preprocess;

use crate::types::{BindType, BindingInfo};

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse shader {name}:\n{message}")]
    Parse { name: String, message: String },
    #[error("failed to validate shader {name}:\n{message}")]
    Validate { name: String, message: String },
    #[error("shader {name} has no entry points")]
    NoEntryPoints { name: String },
    #[error("failed to read shader directory: {0}")]
    Io(#[from] std::io::Error),
}

/// A preprocessed, validated shader permutation together with the binding
/// interface reflected out of it.
#[derive(Debug)]
pub struct ShaderInfo {
    pub source: String,
    pub module: Module,
    pub module_info: ModuleInfo,
    /// Workgroup size of the compute entry point, when one is present.
    pub workgroup_size: Option<[u32; 3]>,
    /// Buffer bindings used by any entry point, ordered by `(group, binding)`.
    pub bindings: Vec<BindingInfo>,
}

pub fn shader_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/shader"))
}

impl ShaderInfo {
    pub fn new(name: &str, source: String) -> Result<Self, Error> {
        let module = wgsl::parse_str(&source).map_err(|error| Error::Parse {
            name: name.to_string(),
            message: error.emit_to_string(&source),
        })?;
        let module_info = Validator::new(
            ValidationFlags::all() & !ValidationFlags::CONTROL_FLOW_UNIFORMITY,
            Capabilities::all(),
        )
        .validate(&module)
        .map_err(|error| Error::Validate {
            name: name.to_string(),
            message: error.emit_to_string(&source),
        })?;
        if module.entry_points.is_empty() {
            return Err(Error::NoEntryPoints {
                name: name.to_string(),
            });
        }

        let mut workgroup_size = None;
        let mut bindings: Vec<BindingInfo> = vec![];
        let mut seen = HashSet::new();
        for (entry_index, entry) in module.entry_points.iter().enumerate() {
            if entry.stage == ShaderStage::Compute {
                workgroup_size = Some(entry.workgroup_size);
            }
            let entry_info = module_info.get_entry_point(entry_index);
            for (var_handle, var) in module.global_variables.iter() {
                if entry_info[var_handle].is_empty() {
                    continue;
                }
                let Some(binding) = &var.binding else {
                    continue;
                };
                let location = (binding.group, binding.binding);
                if !seen.insert(location) {
                    continue;
                }
                let ty = match var.space {
                    AddressSpace::Storage { access } if access.contains(StorageAccess::STORE) => {
                        BindType::Buffer
                    }
                    AddressSpace::Storage { .. } => BindType::BufReadOnly,
                    AddressSpace::Uniform => BindType::Uniform,
                    _ => continue,
                };
                bindings.push(BindingInfo {
                    name: var.name.clone(),
                    location,
                    ty,
                });
            }
        }
        bindings.sort_by_key(|resource| resource.location);

        Ok(Self {
            source,
            module,
            module_info,
            workgroup_size,
            bindings,
        })
    }

    pub fn from_default() -> Result<HashMap<String, Self>, Error> {
        Self::from_dir(shader_dir())
    }

    pub fn from_dir(shader_dir: &Path) -> Result<HashMap<String, Self>, Error> {
        let permutation_map = match fs::read_to_string(shader_dir.join("permutations")) {
            Ok(source) => permutations::parse(&source),
            Err(_) => HashMap::default(),
        };
        let imports = preprocess::get_imports(shader_dir)?;
        let mut info = HashMap::default();
        for entry in shader_dir.read_dir()? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(shader_name) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".wgsl"))
            else {
                continue;
            };
            let contents = fs::read_to_string(shader_dir.join(&file_name))?;
            match permutation_map.get(shader_name) {
                Some(permutations) => {
                    for permutation in permutations {
                        let defines = permutation.defines.iter().cloned().collect();
                        let source =
                            preprocess::preprocess(&contents, shader_name, &defines, &imports);
                        info.insert(
                            permutation.name.clone(),
                            Self::new(&permutation.name, source)?,
                        );
                    }
                }
                None => {
                    let source =
                        preprocess::preprocess(&contents, shader_name, &HashSet::new(), &imports);
                    info.insert(shader_name.to_string(), Self::new(shader_name, source)?);
                }
            }
        }
        Ok(info)
    }
}
