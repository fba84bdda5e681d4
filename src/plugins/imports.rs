//! Collect-phase plugin recording every import of the current file.

use crate::analysis::{ImportBindingKind, NodeKind};
use crate::pipeline::Plugin;
use crate::resolve::{ImportKind, ImportRecord};

use super::names;

pub(crate) fn plugin() -> Plugin {
    Plugin::new(names::IMPORTS).on_collect(|ctx| {
        let NodeKind::Import {
            bindings,
            source,
            type_only,
        } = ctx.kind()
        else {
            return Ok(());
        };

        if bindings.is_empty() {
            let mut record = ImportRecord::new(ImportKind::SideEffect, source.clone(), None);
            record.is_type_only = *type_only;
            ctx.collect_import(record);
            return Ok(());
        }

        for binding in bindings {
            let kind = match binding.kind {
                ImportBindingKind::Default => ImportKind::Default,
                ImportBindingKind::Named => ImportKind::Named,
                ImportBindingKind::Namespace => ImportKind::Aggregate,
            };
            let mut record = ImportRecord::new(kind, source.clone(), Some(binding.local.clone()));
            record.imported_name = binding.imported.clone();
            record.is_type_only = binding.type_only;
            ctx.collect_import(record);
        }
        Ok(())
    })
}
