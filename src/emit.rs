//! Source emission for finished binding specifications
//!
//! The resolver's contract with code generation is the [`BindingSpec`] alone.
//! [`JavaEmitter`] turns one into a `<Host>_BundleBinder` class with two
//! static methods:
//! - `bind(target, bundle)` reads every key into its field, failing on
//!   missing required keys
//! - `pack(target, bundle)` writes every field back under its key
//!
//! Both delegate to the parent specification's binder first.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use crate::binding::{BindingSpec, FieldBinding};
use crate::config::EmitterConfig;
use crate::types::{self, BUNDLE};

/// Produces source text for one binding specification.
pub trait SourceEmitter {
    fn emit(&self, spec: &BindingSpec) -> GeneratedFile;
}

/// One generated compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub package: String,
    pub type_name: String,
    pub source: String,
}

impl GeneratedFile {
    /// `com/example/Foo_BundleBinder.java`
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.package.split('.').filter(|s| !s.is_empty()).collect();
        path.push(format!("{}.java", self.type_name));
        path
    }

    /// Write under `root`, creating package directories.
    pub fn write_to(&self, root: &Path) -> io::Result<PathBuf> {
        let path = root.join(self.relative_path());
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, &self.source)?;
        Ok(path)
    }
}

/// Emits Java binder classes.
#[derive(Debug, Clone)]
pub struct JavaEmitter {
    binder_suffix: String,
}

impl Default for JavaEmitter {
    fn default() -> Self {
        Self::new(&EmitterConfig::default())
    }
}

impl JavaEmitter {
    pub fn new(config: &EmitterConfig) -> Self {
        Self {
            binder_suffix: config.binder_suffix.clone(),
        }
    }

    /// Binder class name for a host type. Nested hosts are flattened with
    /// `$`: `a.Outer.Inner` gets `Outer$Inner_BundleBinder`.
    fn binder_simple_name(&self, host: &str) -> String {
        format!("{}{}", types::class_path(host).replace('.', "$"), self.binder_suffix)
    }

    /// Fully qualified binder name for a host type.
    pub fn binder_name(&self, host: &str) -> String {
        match types::package_name(host) {
            "" => self.binder_simple_name(host),
            package => format!("{package}.{}", self.binder_simple_name(host)),
        }
    }

    fn write_bind(&self, out: &mut String, spec: &BindingSpec, host: &str) {
        let container = types::simple_name(BUNDLE);
        let _ = writeln!(out, "  public static void bind({host} target, {container} bundle) {{");
        if let Some(parent) = spec.parent() {
            let _ = writeln!(out, "    {}.bind(target, bundle);", self.binder_name(parent.host()));
        }
        for field in spec.fields() {
            write_read(out, field);
        }
        out.push_str("  }\n");
    }

    fn write_pack(&self, out: &mut String, spec: &BindingSpec, host: &str) {
        let container = types::simple_name(BUNDLE);
        let _ = writeln!(out, "  public static void pack({host} target, {container} bundle) {{");
        if let Some(parent) = spec.parent() {
            let _ = writeln!(out, "    {}.pack(target, bundle);", self.binder_name(parent.host()));
        }
        for field in spec.fields() {
            let _ = writeln!(
                out,
                "    bundle.{}(\"{}\", target.{});",
                field.kind.setter(),
                escape(&field.key),
                field.name
            );
        }
        out.push_str("  }\n");
    }
}

fn write_read(out: &mut String, field: &FieldBinding) {
    let key = escape(&field.key);
    if !field.description.is_empty() {
        let _ = writeln!(out, "    // {}: {}", field.name, field.description.replace('\n', " "));
    }
    let _ = writeln!(out, "    if (bundle.containsKey(\"{key}\")) {{");
    let cast = if field.kind.needs_cast() {
        format!("({}) ", field.declared_type)
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "      target.{} = {}bundle.{}(\"{key}\");",
        field.name,
        cast,
        field.kind.getter()
    );
    if field.required {
        out.push_str("    } else {\n");
        let _ = writeln!(
            out,
            "      throw new IllegalStateException(\"Missing required value for key '{key}' ({})\");",
            field.name
        );
    }
    out.push_str("    }\n");
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl SourceEmitter for JavaEmitter {
    fn emit(&self, spec: &BindingSpec) -> GeneratedFile {
        let host = spec.class_path();
        let type_name = self.binder_simple_name(spec.host());
        let package = spec.package().to_string();

        let mut out = String::new();
        out.push_str("// Generated by bundlewire. Do not modify.\n");
        if !package.is_empty() {
            let _ = writeln!(out, "package {package};\n");
        }
        let _ = writeln!(out, "import {BUNDLE};\n");
        let _ = writeln!(out, "public class {type_name} {{");
        self.write_bind(&mut out, spec, host);
        out.push('\n');
        self.write_pack(&mut out, spec, host);
        out.push_str("}\n");

        GeneratedFile {
            package,
            type_name,
            source: out,
        }
    }
}
