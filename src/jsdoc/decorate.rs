//! Applying parsed JSDoc to manifest records.

use super::JsDocBlock;
use crate::analysis::{Ast, NodeId, NodeKind};
use crate::manifest::{
    ClassDeclaration, Field, FunctionDeclaration, Method, Parameter, Privacy, ReturnInfo,
    TypeInfo, VariableDeclaration,
};

/// Records with a description, summary and deprecation notice.
pub trait Documented {
    fn description_mut(&mut self) -> &mut String;
    fn summary_mut(&mut self) -> &mut Option<String>;
    fn deprecated_mut(&mut self) -> &mut Option<String>;
}

macro_rules! impl_documented {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Documented for $ty {
                fn description_mut(&mut self) -> &mut String {
                    &mut self.description
                }
                fn summary_mut(&mut self) -> &mut Option<String> {
                    &mut self.summary
                }
                fn deprecated_mut(&mut self) -> &mut Option<String> {
                    &mut self.deprecated
                }
            }
        )*
    };
}

impl_documented!(
    ClassDeclaration,
    FunctionDeclaration,
    VariableDeclaration,
    Field,
    Method,
);

/// Description, `@summary` and `@deprecated`.
pub fn apply_common<D: Documented + ?Sized>(doc: &mut D, blocks: &[JsDocBlock]) {
    for block in blocks {
        if !block.description.is_empty() {
            *doc.description_mut() = block.description.clone();
        }
        for tag in &block.tags {
            if tag.is("summary") && !tag.description.is_empty() {
                *doc.summary_mut() = Some(tag.description.clone());
            } else if tag.is("deprecated") {
                let notice = if tag.description.is_empty() {
                    "true".to_string()
                } else {
                    tag.description.clone()
                };
                *doc.deprecated_mut() = Some(notice);
            } else if (tag.is("description") || tag.is("desc")) && !tag.description.is_empty() {
                *doc.description_mut() = tag.description.clone();
            }
        }
    }
}

/// `@type {T} [description]` overrides the inferred type and, when given, the
/// description.
pub fn apply_type(type_info: &mut Option<TypeInfo>, description: &mut String, blocks: &[JsDocBlock]) {
    for tag in blocks.iter().flat_map(|b| b.tags.iter()).filter(|t| t.is("type")) {
        if let Some(text) = &tag.type_text {
            *type_info = Some(TypeInfo::new(text.clone()));
        }
        if !tag.description.is_empty() {
            *description = tag.description.clone();
        }
    }
}

/// Everything a field can pick up from its own JSDoc.
pub fn apply_field_tags(field: &mut Field, blocks: &[JsDocBlock]) {
    apply_common(field, blocks);
    apply_type(&mut field.type_info, &mut field.description, blocks);

    for tag in blocks.iter().flat_map(|b| b.tags.iter()) {
        let lower = tag.tag.to_ascii_lowercase();
        match lower.as_str() {
            "readonly" => field.readonly = Some(true),
            "reflect" => field.reflects = Some(true),
            "default" if field.default.is_none() && !tag.description.is_empty() => {
                field.default = Some(tag.description.clone());
            }
            "public" | "private" | "protected" => field.privacy = Privacy::parse(&lower),
            "attr" | "attribute" => {
                let name = if tag.name.is_empty() {
                    field.name.clone()
                } else {
                    tag.name.clone()
                };
                field.attribute = Some(name);
            }
            _ => {}
        }
    }
}

/// `@ignore` or `@internal` anywhere excludes the node from the output.
pub fn has_ignore(blocks: &[JsDocBlock]) -> bool {
    blocks
        .iter()
        .any(|b| b.has_tag("ignore") || b.has_tag("internal"))
}

/// Return info from a type annotation and `@returns`.
pub fn return_info(annotation: Option<&str>, blocks: &[JsDocBlock]) -> Option<ReturnInfo> {
    let mut info = ReturnInfo {
        type_info: annotation.map(TypeInfo::new),
        description: String::new(),
    };
    for tag in blocks
        .iter()
        .flat_map(|b| b.tags.iter())
        .filter(|t| t.is("returns") || t.is("return"))
    {
        if info.type_info.is_none() {
            info.type_info = tag.type_text.clone().map(TypeInfo::new);
        }
        if !tag.description.is_empty() {
            info.description = tag.description.clone();
        }
    }
    (info.type_info.is_some() || !info.description.is_empty()).then_some(info)
}

/// Parameters of a function-like node, enriched with `@param` tags.
pub fn parameters_with_docs(ast: &Ast, params: &[NodeId], blocks: &[JsDocBlock]) -> Vec<Parameter> {
    params
        .iter()
        .filter_map(|id| match ast.kind(*id) {
            NodeKind::Parameter(p) => Some(p),
            _ => None,
        })
        .map(|p| {
            let mut param = Parameter {
                name: p.name.clone(),
                type_info: p.type_annotation.clone().map(TypeInfo::new),
                default: p.default.map(|d| ast.print(d).to_string()),
                optional: p.optional.then_some(true),
                rest: p.rest.then_some(true),
                ..Default::default()
            };
            let tags = blocks
                .iter()
                .flat_map(|b| b.tags.iter())
                .filter(|t| t.is("param") || t.is("arg") || t.is("argument"));
            for tag in tags.filter(|t| t.name == p.name) {
                param.description = tag.description.clone();
                if param.type_info.is_none() {
                    param.type_info = tag.type_text.clone().map(TypeInfo::new);
                }
                if tag.optional {
                    param.optional = Some(true);
                }
                if param.default.is_none() {
                    param.default = tag.default.clone();
                }
            }
            param
        })
        .collect()
}
