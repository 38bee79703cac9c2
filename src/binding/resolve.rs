//! Compile-time binding resolution
//!
//! Scans every catalog annotation across the program, validates each
//! annotated field, groups fields by host type and links every host's
//! specification to the specification of its nearest bound superclass.
//!
//! Diagnostic codes:
//! - BW-100: binding could not be read (unknown host, missing key)
//! - BW-101..104: structural errors (modifiers, host kind, reserved namespace)
//! - BW-110/111: duplicate key / duplicate field
//! - BW-120: superclass cycle
//!
//! Linking is a worklist: a host whose bound superclass is not built yet
//! goes to the back of the queue, so discovery order does not matter.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use super::field::FieldBinding;
use super::spec::{BindingSpec, BindingSpecBuilder};
use crate::catalog::{self, ValueKind};
use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::emit::{GeneratedFile, SourceEmitter};
use crate::model::{AnnotatedElement, Enclosing, Modifier, ProgramModel, TypeElement, TypeKind};

/// Output of one resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    specs: IndexMap<String, Arc<BindingSpec>>,
    diagnostics: Diagnostics,
}

impl Resolution {
    /// Specifications in the order they were finalized (parents first).
    pub fn specs(&self) -> impl Iterator<Item = &Arc<BindingSpec>> {
        self.specs.values()
    }

    pub fn spec(&self, host: &str) -> Option<&Arc<BindingSpec>> {
        self.specs.get(host)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// True when no error diagnostic was reported.
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Brew every specification.
    pub fn emit_all<E: SourceEmitter + ?Sized>(&self, emitter: &E) -> Vec<GeneratedFile> {
        self.specs.values().map(|spec| spec.brew(emitter)).collect()
    }

    /// Brew and write every specification under `root`. Write failures are
    /// reported against the host type.
    pub fn write_all<E: SourceEmitter + ?Sized>(&mut self, emitter: &E, root: &Path) -> Vec<PathBuf> {
        let mut written = Vec::with_capacity(self.specs.len());
        for spec in self.specs.values() {
            let file = spec.brew(emitter);
            match file.write_to(root) {
                Ok(path) => written.push(path),
                Err(e) => self.diagnostics.report(Diagnostic::error(
                    DiagnosticCode::WriteFailed,
                    spec.host(),
                    format!("Unable to write binding for type {}: {}", spec.host(), e),
                )),
            }
        }
        written
    }
}

enum ParentLookup {
    None,
    Found(String),
    Cycle,
}

/// Resolves annotated fields of a [`ProgramModel`] into binding specifications.
pub struct BindingResolver<'a, M: ProgramModel + ?Sized> {
    model: &'a M,
    config: &'a ResolverConfig,
}

impl<'a, M: ProgramModel + ?Sized> BindingResolver<'a, M> {
    pub fn new(model: &'a M, config: &'a ResolverConfig) -> Self {
        Self { model, config }
    }

    pub fn resolve(&self) -> Resolution {
        let mut diagnostics = Diagnostics::new();
        let mut builders: IndexMap<String, BindingSpecBuilder> = IndexMap::new();
        let mut bound: FxHashSet<String> = FxHashSet::default();

        for kind in ValueKind::ALL {
            for element in self.model.elements_annotated_with(kind.annotation_name()) {
                // Parameters belong to the runtime factory compiler.
                let Enclosing::Type(host) = &element.enclosing else {
                    continue;
                };
                self.parse_binding(kind, host, element, &mut builders, &mut bound, &mut diagnostics);
            }
        }

        let specs = self.link(builders, &bound, &mut diagnostics);
        info!(
            specs = specs.len(),
            errors = diagnostics.error_count(),
            "Binding resolution finished"
        );
        Resolution { specs, diagnostics }
    }

    fn parse_binding(
        &self,
        kind: ValueKind,
        host_name: &str,
        element: &AnnotatedElement,
        builders: &mut IndexMap<String, BindingSpecBuilder>,
        bound: &mut FxHashSet<String>,
        diagnostics: &mut Diagnostics,
    ) {
        let annotation = kind.annotation_name();
        let Some(host) = self.model.type_element(host_name) else {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::UnparsableBinding,
                    host_name,
                    format!(
                        "Unable to parse @{annotation} binding: enclosing type '{host_name}' is not part of the program"
                    ),
                )
                .on(&element.name),
            );
            return;
        };

        // Report every structural problem, not just the first.
        let inaccessible = self.is_inaccessible(annotation, element, host, diagnostics);
        let reserved = self.is_in_reserved_namespace(annotation, element, host, diagnostics);
        if inaccessible || reserved {
            return;
        }

        let binding = element
            .annotations
            .iter()
            .find(|a| ValueKind::from_annotation(&a.name) == Some(kind));
        let Some(key) = binding.and_then(|a| a.value.as_deref()) else {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::UnparsableBinding,
                    host_name,
                    format!("Unable to parse @{annotation} binding: no key given"),
                )
                .on(&element.name),
            );
            return;
        };
        let description = binding.and_then(|a| a.desc.as_deref()).unwrap_or("");

        let builder = builders
            .entry(host_name.to_string())
            .or_insert_with(|| BindingSpecBuilder::new(host_name));

        if let Some(existing) = builder.find_by_key(key) {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::DuplicateKey,
                    host_name,
                    format!(
                        "Attempt to use @{annotation} for an already bound key '{key}' on '{}'",
                        existing.name
                    ),
                )
                .on(&element.name),
            );
            return;
        }
        if let Some(existing) = builder.find_by_name(&element.name) {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::DuplicateName,
                    host_name,
                    format!(
                        "Attempt to use @{annotation} for a field already bound by @{} ('{}.{}')",
                        existing.kind.annotation_name(),
                        host_name,
                        existing.name
                    ),
                )
                .on(&element.name),
            );
            return;
        }

        builder.add_field(
            FieldBinding::new(&element.name, kind, key, element.declared_type.clone())
                .required(catalog::is_required(&element.annotations))
                .with_description(description),
        );
        bound.insert(host_name.to_string());
    }

    fn is_inaccessible(
        &self,
        annotation: &str,
        element: &AnnotatedElement,
        host: &TypeElement,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let mut has_error = false;

        if element.has_modifier(Modifier::Private) || element.has_modifier(Modifier::Static) {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::InaccessibleField,
                    &host.name,
                    format!("@{annotation} fields must not be private or static"),
                )
                .on(&element.name),
            );
            has_error = true;
        }

        if host.kind != TypeKind::Class {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::NotInClass,
                    &host.name,
                    format!("@{annotation} fields may only be contained in classes"),
                )
                .on(&element.name),
            );
            has_error = true;
        }

        if host.has_modifier(Modifier::Private) {
            diagnostics.report(
                Diagnostic::error(
                    DiagnosticCode::PrivateHost,
                    &host.name,
                    format!("@{annotation} fields may not be contained in private classes"),
                )
                .on(&element.name),
            );
            has_error = true;
        }

        has_error
    }

    fn is_in_reserved_namespace(
        &self,
        annotation: &str,
        element: &AnnotatedElement,
        host: &TypeElement,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(prefix) = self
            .config
            .reserved_namespaces
            .iter()
            .find(|prefix| host.name.starts_with(prefix.as_str()))
        else {
            return false;
        };

        diagnostics.report(
            Diagnostic::error(
                DiagnosticCode::ReservedNamespace,
                &host.name,
                format!(
                    "@{annotation}-annotated class incorrectly in framework package '{prefix}'. ({})",
                    host.name
                ),
            )
            .on(&element.name),
        );
        true
    }

    /// Nearest superclass of `host` that has bindings.
    fn find_parent(&self, host: &str, bound: &FxHashSet<String>) -> ParentLookup {
        let Some(mut current) = self.model.type_element(host) else {
            return ParentLookup::None;
        };
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(host);

        while let Some(superclass) = self.model.superclass_of(current) {
            if !seen.insert(superclass.name.as_str()) {
                return ParentLookup::Cycle;
            }
            if bound.contains(&superclass.name) {
                return ParentLookup::Found(superclass.name.clone());
            }
            current = superclass;
        }
        ParentLookup::None
    }

    fn link(
        &self,
        builders: IndexMap<String, BindingSpecBuilder>,
        bound: &FxHashSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> IndexMap<String, Arc<BindingSpec>> {
        let mut queue: VecDeque<(String, BindingSpecBuilder)> = builders.into_iter().collect();
        let mut specs: IndexMap<String, Arc<BindingSpec>> = IndexMap::with_capacity(queue.len());
        // Consecutive deferrals since the last finalized spec.
        let mut stalled = 0usize;

        while let Some((host, mut builder)) = queue.pop_front() {
            match self.find_parent(&host, bound) {
                ParentLookup::None => {
                    debug!(host = %host, "Built binding spec without parent");
                }
                ParentLookup::Found(parent) => match specs.get(&parent) {
                    Some(parent_spec) => {
                        debug!(host = %host, parent = %parent, "Built binding spec");
                        builder.set_parent(Arc::clone(parent_spec));
                    }
                    None if stalled < queue.len() => {
                        debug!(host = %host, parent = %parent, "Parent not built yet, deferring");
                        stalled += 1;
                        queue.push_back((host, builder));
                        continue;
                    }
                    None => {
                        // Every queued host waited once without progress.
                        diagnostics.report(Diagnostic::error(
                            DiagnosticCode::SuperclassCycle,
                            &host,
                            format!(
                                "Superclass chain of {host} loops through {parent}; linked without a parent"
                            ),
                        ));
                    }
                },
                ParentLookup::Cycle => {
                    diagnostics.report(Diagnostic::error(
                        DiagnosticCode::SuperclassCycle,
                        &host,
                        format!("Superclass chain of {host} loops back on itself"),
                    ));
                }
            }

            stalled = 0;
            specs.insert(host, Arc::new(builder.build()));
        }
        specs
    }
}
